//! GPIO / peripheral pin assignments for the BTU meter main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Thermistor dividers (ADC1)
// ---------------------------------------------------------------------------

/// Hot-line thermistor — 10 kΩ NTC in series with the divider resistor.
/// ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const T_HOT_ADC_GPIO: i32 = 4;
pub const T_HOT_ADC_CHANNEL: u32 = 3;

/// Cold-line thermistor — same divider topology as the hot line.
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const T_COLD_ADC_GPIO: i32 = 5;
pub const T_COLD_ADC_CHANNEL: u32 = 4;

/// ADC attenuation for both thermistor channels (11 dB → 0 – 3.1 V range).
pub const THERMISTOR_ADC_ATTEN: u32 = 3; // esp_idf_hal::adc::attenuation::DB_11

/// Native ADC resolution (bits).  Raw readings are left-shifted to the
/// 16-bit sample range the conversion math expects.
pub const ADC_RESOLUTION_BITS: u32 = 12;

// ---------------------------------------------------------------------------
// Flow switch (digital, pull-up)
// ---------------------------------------------------------------------------

/// Reed/paddle flow switch to ground.  Internal pull-up enabled:
/// HIGH = switch open (no flow pulse), LOW = switch closed.
pub const FLOW_SWITCH_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Radio module UART (Seeed LoRa-E5)
// ---------------------------------------------------------------------------

/// UART port wired to the LoRa-E5 module (console stays on USB-serial-JTAG).
pub const RADIO_UART_NUM: u32 = 1;
pub const RADIO_UART_TX_GPIO: i32 = 17;
pub const RADIO_UART_RX_GPIO: i32 = 18;
/// LoRa-E5 factory default baud rate.
pub const RADIO_UART_BAUD: u32 = 9_600;
