//! Wraparound-safe tick arithmetic and the uplink transmit scheduler.
//!
//! The clock behind [`ClockPort`](crate::app::ports::ClockPort) is a
//! free-running millisecond counter that rolls over at [`TICKS_PERIOD`]
//! (2^29 ms ≈ 6.2 days).  A deployed meter crosses that boundary routinely,
//! so elapsed time is only ever computed with modular subtraction — a naive
//! `now - then` comparison would stall the uplink for days after a wrap.
//!
//! ```text
//!   elapsed = (now − last_xmit) mod 2^29
//!   fire when elapsed ≥ interval_secs × 1000
//! ```

// ═══════════════════════════════════════════════════════════════
//  Tick arithmetic
// ═══════════════════════════════════════════════════════════════

/// Tick counter modulus.  Values from `ClockPort::ticks_ms` live in
/// `[0, TICKS_PERIOD)`.
pub const TICKS_PERIOD: u32 = 1 << 29;

const TICKS_MASK: u32 = TICKS_PERIOD - 1;

/// Milliseconds from `earlier` to `now` on the wrapping tick clock.
///
/// Correct for exactly one wrap between the two samples; intervals longer
/// than [`TICKS_PERIOD`] are indistinguishable from their remainder, which
/// is fine for an uplink interval capped at ~18 hours.
pub fn ticks_diff(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier) & TICKS_MASK
}

/// Clamp an arbitrary millisecond count into the tick domain.
/// Clock adapters apply this so every tick they hand out is pre-wrapped.
pub fn wrap_ticks(ms: u64) -> u32 {
    (ms & u64::from(TICKS_MASK)) as u32
}

// ═══════════════════════════════════════════════════════════════
//  Transmit scheduler
// ═══════════════════════════════════════════════════════════════

/// Decides when the periodic uplink is due.
///
/// Holds only the tick snapshot of the last transmit; the interval itself
/// lives in [`MeterConfig`](crate::config::MeterConfig) so a downlink
/// interval change takes effect at the very next decision.
pub struct TransmitScheduler {
    last_xmit: u32,
}

impl TransmitScheduler {
    /// Start the interval from `now` — the boot reboot-notice uplink counts
    /// as the first transmit.
    pub fn new(now: u32) -> Self {
        Self { last_xmit: now }
    }

    /// True when a full interval has elapsed since the last transmit.
    pub fn due(&self, now: u32, interval_secs: u16) -> bool {
        ticks_diff(now, self.last_xmit) >= u32::from(interval_secs) * 1_000
    }

    /// Snapshot `now` as the new interval start.  Called when a transmit is
    /// attempted — before the send, so a failed send is not retried until
    /// the next whole interval.
    pub fn mark_sent(&mut self, now: u32) {
        self.last_xmit = now;
    }

    /// Tick snapshot of the last transmit (for diagnostics).
    pub fn last_xmit(&self) -> u32 {
        self.last_xmit
    }
}
