//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                  |
//! |------------|-------------|------------------------------|
//! | `e5`       | Transport   | LoRa-E5 AT-command UART      |
//! | `hardware` | SensorPort  | ESP32 ADC, GPIO              |
//! | `log_sink` | EventSink   | Serial log output            |
//! | `nvs`      | StoragePort | NVS / in-memory store        |
//! | `time`     | ClockPort   | ESP32 system timer           |

pub mod e5;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
