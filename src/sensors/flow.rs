//! Flow-switch debounce state machine.
//!
//! The flow switch is a mechanical paddle/reed contact to ground behind a
//! pull-up, so every real transition arrives wrapped in contact bounce.
//! Rather than counting edges in an ISR, the meter polls the pin once per
//! loop iteration and validates each suspected transition with a second
//! sample after a short settle wait:
//!
//! ```text
//!   STABLE(level) ──raw level differs──▶ SETTLING
//!   SETTLING ──re-sample still differs──▶ STABLE(new level)  [+edge]
//!   SETTLING ──re-sample matches old───▶ STABLE(old level)   [noise]
//! ```
//!
//! Only the open→closed edge is a metering pulse; the reopen is tracked so
//! the next closure is seen, but emits nothing to count.  The settle wait
//! itself belongs to the loop (it is the loop's one blocking suspension
//! point), which is why the machine is split into `observe` / `confirm`.

/// Settle wait between the two samples of a suspected transition.
pub const SETTLE_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Stable,
    Settling,
}

/// An accepted, debounced transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEdge {
    /// Open → closed: exactly one metering pulse.
    Closed,
    /// Closed → open: tracked, never counted.
    Opened,
}

/// Two-phase debouncer over the raw flow-switch level.
///
/// Level convention follows the pull-up wiring: `true` = pin high = switch
/// open, `false` = pin grounded = switch closed.
pub struct FlowDebouncer {
    stable_level: bool,
    state: DebounceState,
}

impl FlowDebouncer {
    /// Seed with the pin level read at boot, so a meter powered up with the
    /// switch already closed does not count a phantom pulse.
    pub fn new(initial_level: bool) -> Self {
        Self {
            stable_level: initial_level,
            state: DebounceState::Stable,
        }
    }

    /// Last debounced-stable level.
    pub fn stable_level(&self) -> bool {
        self.stable_level
    }

    /// Phase 1: present a raw sample.  Returns `true` when the level
    /// differs from the stable one — the caller must then wait
    /// [`SETTLE_MS`] and call [`confirm`](Self::confirm) with a fresh
    /// sample.  Returns `false` (and stays put) otherwise.
    pub fn observe(&mut self, level: bool) -> bool {
        match self.state {
            DebounceState::Stable if level != self.stable_level => {
                self.state = DebounceState::Settling;
                true
            }
            _ => false,
        }
    }

    /// Phase 2: the post-settle re-sample.  A level still differing from
    /// the stable one is an accepted edge; one that bounced back is
    /// rejected as noise.  Calling this outside the settling state does
    /// nothing.
    pub fn confirm(&mut self, level: bool) -> Option<FlowEdge> {
        if self.state != DebounceState::Settling {
            return None;
        }
        self.state = DebounceState::Stable;

        if level == self.stable_level {
            return None;
        }
        let was_open = self.stable_level;
        self.stable_level = level;
        if was_open {
            Some(FlowEdge::Closed)
        } else {
            Some(FlowEdge::Opened)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_closure_emits_one_pulse() {
        let mut d = FlowDebouncer::new(true);
        assert!(d.observe(false));
        assert_eq!(d.confirm(false), Some(FlowEdge::Closed));
        assert!(!d.stable_level());
    }

    #[test]
    fn bounce_that_recovers_is_rejected() {
        let mut d = FlowDebouncer::new(true);
        assert!(d.observe(false));
        // By the re-sample the contact has bounced back open.
        assert_eq!(d.confirm(true), None);
        assert!(d.stable_level());
        // The machine is re-armed for the next suspected transition.
        assert!(d.observe(false));
        assert_eq!(d.confirm(false), Some(FlowEdge::Closed));
    }

    #[test]
    fn reopen_is_tracked_but_not_a_pulse() {
        let mut d = FlowDebouncer::new(false);
        assert!(d.observe(true));
        assert_eq!(d.confirm(true), Some(FlowEdge::Opened));
        assert!(d.stable_level());
    }

    #[test]
    fn matching_level_never_starts_a_settle() {
        let mut d = FlowDebouncer::new(true);
        assert!(!d.observe(true));
        assert!(!d.observe(true));
    }

    #[test]
    fn confirm_without_observe_is_inert() {
        let mut d = FlowDebouncer::new(true);
        assert_eq!(d.confirm(false), None);
        assert!(d.stable_level());
    }

    #[test]
    fn boot_with_closed_switch_counts_no_phantom_pulse() {
        let mut d = FlowDebouncer::new(false);
        assert!(!d.observe(false));
        // Only a reopen followed by a fresh closure counts.
        assert!(d.observe(true));
        assert_eq!(d.confirm(true), Some(FlowEdge::Opened));
        assert!(d.observe(false));
        assert_eq!(d.confirm(false), Some(FlowEdge::Closed));
    }

    #[test]
    fn full_cycle_counts_exactly_one_pulse_per_closure() {
        let mut d = FlowDebouncer::new(true);
        let mut pulses = 0;
        for _ in 0..5 {
            // close
            assert!(d.observe(false));
            if d.confirm(false) == Some(FlowEdge::Closed) {
                pulses += 1;
            }
            // steady closed samples do nothing
            assert!(!d.observe(false));
            // reopen
            assert!(d.observe(true));
            assert_eq!(d.confirm(true), Some(FlowEdge::Opened));
        }
        assert_eq!(pulses, 5);
    }
}
