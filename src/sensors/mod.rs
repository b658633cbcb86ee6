//! Sensor-side domain logic: sample buffering, thermistor conversion and
//! flow-switch debouncing.
//!
//! Nothing in here touches hardware — raw readings arrive through
//! [`SensorPort`](crate::app::ports::SensorPort) and these modules turn
//! them into temperatures and validated pulse events.

pub mod flow;
pub mod sampling;
pub mod thermistor;

pub use flow::{FlowDebouncer, FlowEdge, SETTLE_MS};
pub use sampling::{SampleBuffers, SAMPLE_BUF_LEN};
pub use thermistor::TempReading;
