//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Implements [`SensorPort`] over the two thermistor ADC channels and
//! the flow-switch GPIO.  This is the only module that reads metering
//! hardware.  On non-espidf targets the reads come from injectable
//! atomics so host tests and the bench simulation can script the
//! physical world.

use crate::app::ports::SensorPort;
use crate::pins;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_T_HOT_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_T_COLD_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_FLOW_OPEN: AtomicBool = AtomicBool::new(true);

/// Inject full-scale 16-bit thermistor counts (simulation).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_thermistor_adc(hot_raw: u16, cold_raw: u16) {
    SIM_T_HOT_ADC.store(hot_raw, Ordering::Relaxed);
    SIM_T_COLD_ADC.store(cold_raw, Ordering::Relaxed);
}

/// Inject the flow-switch level (simulation).  `true` = open.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_flow_open(open: bool) {
    SIM_FLOW_OPEN.store(open, Ordering::Relaxed);
}

/// Concrete adapter for the meter's input peripherals.
pub struct HardwareAdapter;

impl HardwareAdapter {
    pub fn new() -> Self {
        Self
    }

    /// One thermistor channel, widened from the ADC's native resolution
    /// to the full 16-bit sample range the conversion math expects.
    #[cfg(target_os = "espidf")]
    fn read_channel(channel: u32) -> u16 {
        hw_init::adc1_read(channel) << (16 - pins::ADC_RESOLUTION_BITS)
    }
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn read_thermistors(&mut self) -> (u16, u16) {
        (
            Self::read_channel(pins::T_HOT_ADC_CHANNEL),
            Self::read_channel(pins::T_COLD_ADC_CHANNEL),
        )
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_thermistors(&mut self) -> (u16, u16) {
        (
            SIM_T_HOT_ADC.load(Ordering::Relaxed),
            SIM_T_COLD_ADC.load(Ordering::Relaxed),
        )
    }

    #[cfg(target_os = "espidf")]
    fn flow_switch_level(&mut self) -> bool {
        hw_init::gpio_read(pins::FLOW_SWITCH_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    fn flow_switch_level(&mut self) -> bool {
        SIM_FLOW_OPEN.load(Ordering::Relaxed)
    }
}
