//! Persistent meter configuration — the device's entire crash-recovery state.
//!
//! One 10-byte little-endian record in NVS holds everything that must
//! survive a power cut: the transmit interval and the two accumulated
//! totals.  The record is read once at boot and written back in full after
//! every mutation (flow pulse, successful uplink, downlink interval change).
//!
//! ## Record layout (version-stable)
//!
//! ```text
//! offset  size  field
//!   0      2    secs_between_xmit  (u16 LE, 0xFFFF = never written)
//!   2      4    heat_count         (u32 LE, low 24 bits meaningful)
//!   6      4    flow_count         (u32 LE, low 24 bits meaningful)
//! ```
//!
//! Erased flash reads as all-0xFF, so "never written" needs no separate
//! marker: the interval sentinel and the counter range check both treat the
//! erased pattern as "use the default".

use log::{info, warn};

use crate::app::ports::{ConfigError, StoragePort, StorageError};

/// NVS namespace shared by all meter subsystems.
pub const NVS_NAMESPACE: &str = "btumeter";
/// NVS key of the packed meter record.
pub const CONFIG_KEY: &str = "meter";

/// Packed record size in bytes.
pub const RECORD_LEN: usize = 10;

/// Counter modulus: `heat_count` and `flow_count` live in `[0, 2^24)`.
pub const COUNT_MODULUS: u32 = 1 << 24;

/// Stored interval value meaning "never written" (erased-flash pattern).
/// Never accepted as a real setting.
pub const INTERVAL_SENTINEL: u16 = 0xFFFF;

/// Compiled-in default transmit interval (10 minutes).
pub const DEFAULT_SECS_BETWEEN_XMIT: u16 = 600;

/// The persisted meter record.
///
/// Counters are plain fields — the accumulator is their single writer and
/// maintains the `[0, COUNT_MODULUS)` range invariant.  The interval is
/// private so every write goes through sentinel validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterConfig {
    secs_between_xmit: u16,
    /// Accumulated heat total, tenths of a degree-pulse, `[0, 2^24)`.
    pub heat_count: u32,
    /// Accumulated flow-pulse total, `[0, 2^24)`.
    pub flow_count: u32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            secs_between_xmit: DEFAULT_SECS_BETWEEN_XMIT,
            heat_count: 0,
            flow_count: 0,
        }
    }
}

impl MeterConfig {
    /// Seconds between scheduled uplinks.  Always below the sentinel.
    pub fn secs_between_xmit(&self) -> u16 {
        self.secs_between_xmit
    }

    /// Validate and set the transmit interval.
    ///
    /// Values at or above [`INTERVAL_SENTINEL`] are rejected — the sentinel
    /// byte pattern must never become a live setting, or a later load would
    /// silently swap it for the default.
    pub fn set_secs_between_xmit(&mut self, secs: u16) -> Result<(), ConfigError> {
        if secs >= INTERVAL_SENTINEL {
            return Err(ConfigError::ValidationFailed(
                "transmit interval must be below 0xFFFF",
            ));
        }
        self.secs_between_xmit = secs;
        Ok(())
    }

    // ── Pack / unpack (the only NVM wire contract) ────────────────

    /// Encode into the fixed little-endian record.
    pub fn pack(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..2].copy_from_slice(&self.secs_between_xmit.to_le_bytes());
        out[2..6].copy_from_slice(&self.heat_count.to_le_bytes());
        out[6..10].copy_from_slice(&self.flow_count.to_le_bytes());
        out
    }

    /// Decode a stored record, applying the defaulting rules:
    ///
    /// - interval == [`INTERVAL_SENTINEL`] → [`DEFAULT_SECS_BETWEEN_XMIT`]
    /// - counter outside `[0, COUNT_MODULUS)` → 0
    ///
    /// Any in-range record round-trips through [`pack`](Self::pack)
    /// unchanged.
    pub fn unpack(bytes: [u8; RECORD_LEN]) -> Self {
        let raw_interval = u16::from_le_bytes([bytes[0], bytes[1]]);
        let raw_heat = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
        let raw_flow = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);

        let secs_between_xmit = if raw_interval == INTERVAL_SENTINEL {
            DEFAULT_SECS_BETWEEN_XMIT
        } else {
            raw_interval
        };
        let heat_count = if raw_heat < COUNT_MODULUS { raw_heat } else { 0 };
        let flow_count = if raw_flow < COUNT_MODULUS { raw_flow } else { 0 };

        Self {
            secs_between_xmit,
            heat_count,
            flow_count,
        }
    }

    // ── Load / save ───────────────────────────────────────────────

    /// Load the record from storage, falling back to defaults when the key
    /// is absent, short, or unreadable.  Never fails: a meter that cannot
    /// read its config still meters.
    pub fn load(store: &impl StoragePort) -> Self {
        let mut buf = [0u8; RECORD_LEN];
        match store.read(NVS_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(RECORD_LEN) => {
                let config = Self::unpack(buf);
                info!(
                    "config: loaded (interval={}s heat={} flow={})",
                    config.secs_between_xmit, config.heat_count, config.flow_count
                );
                config
            }
            Ok(n) => {
                warn!("config: stored record is {n} bytes, expected {RECORD_LEN} — using defaults");
                Self::default()
            }
            Err(StorageError::NotFound) => {
                info!("config: no stored record (first boot) — using defaults");
                Self::default()
            }
            Err(e) => {
                warn!("config: load failed ({e}) — using defaults");
                Self::default()
            }
        }
    }

    /// Re-encode and write the full record atomically.
    pub fn save(&self, store: &mut impl StoragePort) -> Result<(), StorageError> {
        store.write(NVS_NAMESPACE, CONFIG_KEY, &self.pack())
    }
}
