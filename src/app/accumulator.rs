//! Counter accumulation rules.
//!
//! Both counters live in 24 bits on the wire, so every mutation
//! reduces mod 2^24. A flow pulse adds one to the flow counter and
//! `trunc(Δt °F × 10)` to the heat counter; a negative balance is
//! clamped to zero before the wrap so cold-side excursions can never
//! alias into a huge positive total.

use crate::config::{COUNT_MODULUS, MeterConfig};

/// Advance the flow counter by one pulse.
pub fn next_flow(flow_count: u32) -> u32 {
    (flow_count + 1) % COUNT_MODULUS
}

/// Add one pulse worth of heat. The increment is truncated toward
/// zero (2.57 °F adds 25, −0.19 °F subtracts 1). The intermediate
/// sum is carried in i64 with saturation so a degenerate sensor
/// reading cannot overflow.
pub fn add_heat(heat_count: u32, delta_t_f: f64) -> u32 {
    let increment = (delta_t_f * 10.0) as i64;
    let sum = i64::from(heat_count).saturating_add(increment);
    (sum.max(0) % i64::from(COUNT_MODULUS)) as u32
}

/// Apply one confirmed flow pulse to the running counters.
pub fn apply_pulse(config: &mut MeterConfig, delta_t_f: f64) {
    config.flow_count = next_flow(config.flow_count);
    config.heat_count = add_heat(config.heat_count, delta_t_f);
}
