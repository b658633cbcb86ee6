//! Shared-index circular buffers for the two thermistor channels.
//!
//! Both channels are pushed together once per loop iteration and share one
//! write index, so hot and cold averages always cover the same window of
//! time.  The buffers start zero-filled and the mean always divides by the
//! full capacity — early readings are biased low until one full
//! revolution (~100 iterations) has overwritten the zeros.  That startup
//! transient is a known, accepted property of the meter; downstream
//! consumers must not be surprised by a cold start reading near −460 °F.

/// Samples retained per channel.
pub const SAMPLE_BUF_LEN: usize = 100;

/// Paired hot/cold raw-sample history.
pub struct SampleBuffers {
    hot: [u16; SAMPLE_BUF_LEN],
    cold: [u16; SAMPLE_BUF_LEN],
    index: usize,
}

impl SampleBuffers {
    pub fn new() -> Self {
        Self {
            hot: [0; SAMPLE_BUF_LEN],
            cold: [0; SAMPLE_BUF_LEN],
            index: 0,
        }
    }

    /// Overwrite the current slot in both channels, then advance the shared
    /// index (round-robin).
    pub fn push(&mut self, hot_raw: u16, cold_raw: u16) {
        self.hot[self.index] = hot_raw;
        self.cold[self.index] = cold_raw;
        self.index = (self.index + 1) % SAMPLE_BUF_LEN;
    }

    /// Arithmetic mean of the hot channel over the full buffer.
    pub fn hot_mean(&self) -> f64 {
        Self::mean(&self.hot)
    }

    /// Arithmetic mean of the cold channel over the full buffer.
    pub fn cold_mean(&self) -> f64 {
        Self::mean(&self.cold)
    }

    fn mean(slots: &[u16; SAMPLE_BUF_LEN]) -> f64 {
        let sum: u32 = slots.iter().map(|&v| u32::from(v)).sum();
        f64::from(sum) / SAMPLE_BUF_LEN as f64
    }
}

impl Default for SampleBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zero_filled() {
        let b = SampleBuffers::new();
        assert_eq!(b.hot_mean(), 0.0);
        assert_eq!(b.cold_mean(), 0.0);
    }

    #[test]
    fn partial_fill_averages_over_full_capacity() {
        let mut b = SampleBuffers::new();
        b.push(1_000, 2_000);
        // 99 zero slots still participate in the average.
        assert_eq!(b.hot_mean(), 10.0);
        assert_eq!(b.cold_mean(), 20.0);
    }

    #[test]
    fn full_buffer_of_constant_value_averages_to_it() {
        let mut b = SampleBuffers::new();
        for _ in 0..SAMPLE_BUF_LEN {
            b.push(30_000, 30_000);
        }
        assert_eq!(b.hot_mean(), 30_000.0);
        assert_eq!(b.cold_mean(), 30_000.0);
    }

    #[test]
    fn wraps_and_overwrites_oldest() {
        let mut b = SampleBuffers::new();
        for _ in 0..SAMPLE_BUF_LEN {
            b.push(100, 100);
        }
        // One more push lands on index 0, replacing a 100 with a 300.
        b.push(300, 300);
        let expected = (100.0 * (SAMPLE_BUF_LEN as f64 - 1.0) + 300.0) / SAMPLE_BUF_LEN as f64;
        assert_eq!(b.hot_mean(), expected);
    }

    #[test]
    fn channels_advance_in_lockstep() {
        let mut b = SampleBuffers::new();
        for i in 0..(SAMPLE_BUF_LEN as u16 * 2) {
            b.push(i, i + 7);
        }
        // After two full revolutions both means reflect the same window.
        assert_eq!(b.cold_mean() - b.hot_mean(), 7.0);
    }
}
