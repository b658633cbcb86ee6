//! Steinhart–Hart thermistor conversion for the divider topology.
//!
//! Each line's NTC thermistor sits between the ADC input and ground, with
//! the divider resistor up to the supply rail, so the raw count rises with
//! resistance:
//!
//! ```text
//!   R_therm = raw / (ADC_MAX − raw) · R_divider
//!   1 / T_kelvin = c1 + c2·ln(R) + c3·ln(R)³
//!   T_°F = 1.8 / (c1 + c2·ln(R) + c3·ln(R)³) − 459.67
//! ```
//!
//! The conversion never fails: a non-positive computed resistance (shorted
//! input, zero-filled startup buffers) substitutes a huge negative value
//! for `ln(R)` and the math carries on, producing an extreme but finite
//! temperature near absolute zero instead of a domain error.  A raw mean at
//! full scale drives the resistance to infinity and lands at −459.67 °F the
//! same way.  All arithmetic is f64 — the cubic coefficient is ~1e-7 and
//! gets multiplied by ln³ terms, which is noise-dominated in f32.

use crate::sensors::sampling::SampleBuffers;
use crate::settings::CalibrationSettings;

/// Stand-in for `ln(R)` when the computed resistance is non-positive.
const LN_DEGENERATE: f64 = -9.99e99;

/// One temperature snapshot across both lines, °F.
#[derive(Debug, Clone, Copy)]
pub struct TempReading {
    pub hot_f: f64,
    pub cold_f: f64,
    /// `hot_f − cold_f`.
    pub delta_f: f64,
}

/// Convert an averaged raw count to °F.  Total function: defined for every
/// `mean_raw`, including 0 and full scale.
pub fn temperature_f(mean_raw: f64, settings: &CalibrationSettings) -> f64 {
    let adc_max = f64::from(settings.adc_max);
    let resistance = mean_raw / (adc_max - mean_raw) * settings.divider_ohms;
    let ln_r = if resistance > 0.0 {
        resistance.ln()
    } else {
        LN_DEGENERATE
    };
    let c = settings.coefficients;
    let denom = c.c1 + c.c2 * ln_r + c.c3 * ln_r * ln_r * ln_r;
    1.8 / denom - 459.67
}

/// Current hot/cold/delta temperatures from the buffer means, with the
/// field calibration offset split evenly across the two lines.
pub fn current_temps(buffers: &SampleBuffers, settings: &CalibrationSettings) -> TempReading {
    let half_cal = settings.delta_t_calib_f / 2.0;
    let hot_f = temperature_f(buffers.hot_mean(), settings) + half_cal;
    let cold_f = temperature_f(buffers.cold_mean(), settings) - half_cal;
    TempReading {
        hot_f,
        cold_f,
        delta_f: hot_f - cold_f,
    }
}
