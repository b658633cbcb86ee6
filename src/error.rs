//! Unified error types for the BTU meter firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level control loop's error handling
//! uniform.  All variants are `Copy` so a cycle result can be passed around
//! and logged without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
///
/// An `Err(Error)` escaping a loop cycle is the "unexpected fault" case: the
/// loop driver logs it, pauses briefly and carries on.  Faults that are part
/// of normal operation (sentinel defaulting, degenerate sensor readings,
/// undecodable downlink bytes) never become an `Error` — they are handled
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The radio transport failed to read or write.
    Transport(TransportError),
    /// Non-volatile storage failed.
    Storage(StorageError),
    /// Persistent configuration is invalid or could not be applied.
    Config(ConfigError),
    /// Uplink payload encoding failed.
    Codec(CodecError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Radio byte-stream failures, as classified at the loop boundary.
///
/// The concrete adapter error (UART return code, simulated fault) is logged
/// at the point of failure; the loop only needs the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Reading the inbound byte stream failed.
    ReadFailed,
    /// Writing an uplink frame failed.  Not retried until the next
    /// scheduled interval.
    WriteFailed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::WriteFailed => write!(f, "write failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Uplink payload encoding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// A temperature was negative.  Negative temperatures are outside the
    /// uplink contract; the payload is not built and the transmit slot is
    /// skipped.
    NegativeTemperature,
    /// A field did not fit the fixed-width payload buffer.
    Overflow,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeTemperature => write!(f, "negative temperature"),
            Self::Overflow => write!(f, "payload overflow"),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Port-error funnels
// ---------------------------------------------------------------------------

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience alias used throughout the firmware.
pub type Result<T> = core::result::Result<T, Error>;
