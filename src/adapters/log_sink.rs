//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured meter events to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).  This is
//! the meter's entire local observability surface — a field technician
//! watching the console sees every pulse, report and downlink.

use log::info;

use crate::app::events::MeterEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`MeterEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &MeterEvent) {
        match event {
            MeterEvent::FlowPulse {
                heat_count,
                flow_count,
                t_hot_f,
                t_cold_f,
            } => {
                info!(
                    "PULSE | flow={} heat={} | hot={:.2}\u{00b0}F cold={:.2}\u{00b0}F",
                    flow_count, heat_count, t_hot_f, t_cold_f,
                );
            }
            MeterEvent::UplinkSent { payload } => {
                info!("XMIT  | {}", payload);
            }
            MeterEvent::DownlinkLine { line } => {
                info!("RECV  | {}", line);
            }
            MeterEvent::IntervalChanged { secs } => {
                info!("CONF  | transmit interval -> {}s", secs);
            }
        }
    }
}
