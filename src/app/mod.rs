//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the BTU meter: counter
//! accumulation, the per-cycle orchestration in [`service`], and the
//! downlink command handler.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod accumulator;
pub mod downlink;
pub mod events;
pub mod ports;
pub mod service;
