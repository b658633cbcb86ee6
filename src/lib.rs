//! BTU meter firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod link;
pub mod scheduler;
pub mod settings;

mod pins;

// Hardware-facing modules; the device-only implementations are guarded
// by cfg attributes inside, with simulation fallbacks for the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
