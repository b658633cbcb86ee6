//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`] for the metering loop.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Ticks leave this adapter already wrapped to the shared tick modulus;
//! nothing downstream ever sees the raw 64-bit timer value.

use crate::app::ports::ClockPort;
use crate::scheduler::wrap_ticks;

/// Clock adapter for the ESP32-S3 platform.
pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Seconds since boot (monotonic, unwrapped).
    pub fn uptime_secs(&self) -> u64 {
        self.uptime_ms() / 1000
    }
}

impl ClockPort for Esp32Clock {
    fn ticks_ms(&self) -> u32 {
        wrap_ticks(self.uptime_ms())
    }

    /// `std::thread::sleep` suspends the calling FreeRTOS task on the
    /// device and the thread on the host, so one implementation serves
    /// both targets.
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TICKS_PERIOD;

    #[test]
    fn ticks_are_wrapped_and_monotonic_over_short_spans() {
        let clock = Esp32Clock::new();
        let a = clock.ticks_ms();
        let b = clock.ticks_ms();
        assert!(a < TICKS_PERIOD);
        assert!(b < TICKS_PERIOD);
        assert!(b >= a);
    }

    #[test]
    fn delay_blocks_for_at_least_the_requested_time() {
        let mut clock = Esp32Clock::new();
        let before = std::time::Instant::now();
        clock.delay_ms(5);
        assert!(before.elapsed().as_millis() >= 5);
    }
}
