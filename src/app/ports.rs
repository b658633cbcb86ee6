//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MeterService (domain)
//! ```
//!
//! Driven adapters (sensors, clock, storage, event sinks) implement these
//! traits.  The [`MeterService`](super::service::MeterService) consumes them
//! via generics, so the domain core never touches hardware directly and the
//! whole metering loop runs unmodified against in-memory test doubles.
//!
//! The radio byte stream has its own trait
//! ([`Transport`](crate::link::transport::Transport)) in the link layer.

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain raw sensor data.
///
/// There is no error channel — the ADC and GPIO are assumed always
/// available, and a wedged peripheral surfaces as degenerate readings
/// (which the conversion math tolerates), not as a fault.
pub trait SensorPort {
    /// One raw reading per thermistor channel, `(hot, cold)`, each in
    /// the full 16-bit sample range `[0, ADC max]`.
    fn read_thermistors(&mut self) -> (u16, u16);

    /// Raw flow-switch level.  `true` = pin high = switch open (pull-up),
    /// `false` = pin pulled to ground = switch closed.
    fn flow_switch_level(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: time source → domain)
// ───────────────────────────────────────────────────────────────

/// Millisecond tick source plus the loop's only blocking wait.
///
/// `ticks_ms` wraps at the shared tick modulus
/// ([`TICKS_PERIOD`](crate::scheduler::TICKS_PERIOD)); callers must compare
/// ticks only through [`ticks_diff`](crate::scheduler::ticks_diff).
pub trait ClockPort {
    /// Free-running millisecond counter, already wrapped to the tick modulus.
    fn ticks_ms(&self) -> u32;

    /// Block the loop for `ms` milliseconds.  Used for the debounce settle
    /// wait and the fault-recovery pause; nothing else may block.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`MeterEvent`](super::events::MeterEvent)s
/// through this port.  Adapters decide where they go (serial log today;
/// a display or debug console later).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::MeterEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for the meter record, calibration settings
/// and crash logs.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic — no partial writes on power loss.
///   The ESP-IDF NVS API guarantees this natively; the in-memory simulation
///   achieves it trivially.  The meter record relies on this: a power cut
///   mid-save leaves the previous totals readable.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration decode / validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored record failed structural decode (wrong length).
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "record corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
