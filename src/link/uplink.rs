//! Uplink payload codec.
//!
//! A meter report is a fixed 22-character ASCII hex string:
//! ```text
//! ┌────┬──────────┬──────────┬────────┬────────┐
//! │ 05 │ heat (6) │ flow (6) │ hot(4) │ cold(4)│
//! └────┴──────────┴──────────┴────────┴────────┘
//! ```
//! Counters are rendered as 24-bit values, temperatures as unsigned
//! tenths of a degree Fahrenheit. The receiving side indexes into
//! the string by position, so the width of every field is load-bearing.

use core::fmt::Write;

use crate::config::COUNT_MODULUS;
use crate::error::CodecError;

/// Total payload length in characters.
pub const UPLINK_LEN: usize = 22;

/// Message type tag for a periodic meter report.
pub const DATA_TYPE_TAG: &str = "05";

pub type UplinkPayload = heapless::String<UPLINK_LEN>;

/// Convert a temperature to unsigned tenths-of-°F, rounding half up.
///
/// Values above the u16 range clamp to `0xFFFF`. Negative input is
/// out of contract for the wire format and is rejected rather than
/// wrapped into a bogus positive reading.
pub fn temp_tenths(t_f: f64) -> Result<u16, CodecError> {
    if t_f < 0.0 {
        return Err(CodecError::NegativeTemperature);
    }
    Ok((t_f * 10.0 + 0.5) as u16)
}

/// Encode one meter report.
///
/// Counters are reduced mod 2^24 so the hex fields can never widen
/// past six digits. Rejects negative temperatures; right after boot
/// the sample means sit near absolute zero until the buffers fill,
/// and callers treat the rejection as a skipped report.
pub fn encode(
    heat_count: u32,
    flow_count: u32,
    t_hot_f: f64,
    t_cold_f: f64,
) -> Result<UplinkPayload, CodecError> {
    let hot = temp_tenths(t_hot_f)?;
    let cold = temp_tenths(t_cold_f)?;
    let heat = heat_count % COUNT_MODULUS;
    let flow = flow_count % COUNT_MODULUS;

    let mut payload = UplinkPayload::new();
    write!(payload, "{DATA_TYPE_TAG}{heat:06X}{flow:06X}{hot:04X}{cold:04X}")
        .map_err(|_| CodecError::Overflow)?;
    Ok(payload)
}
