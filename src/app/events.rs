//! Outbound application events.
//!
//! The [`MeterService`](super::service::MeterService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, mirror onto a bench
//! display, feed a test recorder, etc.

use crate::link::framer::MAX_LINE_LEN;
use crate::link::uplink::UplinkPayload;

/// Structured events emitted by the metering core.
#[derive(Debug, Clone, PartialEq)]
pub enum MeterEvent {
    /// A debounced flow pulse was counted (carries the counters after
    /// the update and the temperatures that priced the pulse).
    FlowPulse {
        heat_count: u32,
        flow_count: u32,
        t_hot_f: f64,
        t_cold_f: f64,
    },

    /// A periodic report left through the radio port.
    UplinkSent { payload: UplinkPayload },

    /// A complete line arrived from the radio module.
    DownlinkLine { line: heapless::String<MAX_LINE_LEN> },

    /// A downlink command changed the reporting interval.
    IntervalChanged { secs: u16 },
}
