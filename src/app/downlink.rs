//! Downlink command handling.
//!
//! The network can push a new reporting interval to the meter. The
//! server schedules it against an uplink window, so by the time the
//! module prints the notification line the payload is just:
//!
//! ```text
//! +MSG: PORT: 8; RX: "0258"; RSSI: -33, SNR: 14
//!                     └┬─┘
//!                      interval in seconds, 4 hex digits
//! ```
//!
//! Anything that is not a well-formed interval payload is module
//! chatter (join notices, send confirmations) and is only logged.

use log::{debug, info, warn};

use super::events::MeterEvent;
use super::ports::{EventSink, StoragePort};
use crate::config::MeterConfig;
use crate::error::Result;

const RX_MARKER: &str = "RX: \"";

/// A decoded downlink command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownlinkCommand {
    /// Replace the seconds-between-reports interval.
    SetInterval(u16),
}

/// Extract a command from one received line.
///
/// Returns `None` for module chatter and for payloads that are not
/// exactly four hex digits. Validation of the *value* (the `0xFFFF`
/// sentinel is not a legal interval) is left to the config layer.
pub fn parse_line(line: &str) -> Option<DownlinkCommand> {
    let start = line.find(RX_MARKER)? + RX_MARKER.len();
    let rest = &line[start..];
    let end = rest.find('"')?;
    let hex = &rest[..end];
    if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let secs = u16::from_str_radix(hex, 16).ok()?;
    Some(DownlinkCommand::SetInterval(secs))
}

/// Act on one complete downlink line.
///
/// A valid interval is applied to the live config and persisted at
/// once, so a power cut right after the change cannot roll it back.
/// A rejected value is logged and dropped without disturbing the
/// running interval.
pub fn handle_line(
    line: &str,
    config: &mut MeterConfig,
    store: &mut impl StoragePort,
    sink: &mut impl EventSink,
) -> Result<()> {
    match parse_line(line) {
        Some(DownlinkCommand::SetInterval(secs)) => {
            if let Err(reason) = config.set_secs_between_xmit(secs) {
                warn!("downlink: interval {secs} rejected: {reason}");
                return Ok(());
            }
            config.save(store)?;
            info!("downlink: reporting interval set to {secs}s");
            sink.emit(&MeterEvent::IntervalChanged { secs });
            Ok(())
        }
        None => {
            debug!("downlink chatter: {line}");
            Ok(())
        }
    }
}
