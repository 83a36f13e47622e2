//! Restartable interval timeouts
//!
//! A [`Timeout`] is a deadline measured against the monotonic clock. It is
//! polled from the main loop only; the tick interrupt never touches it.

use crate::clock::Micros;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    /// Never started, or aborted
    Inactive,
    /// Counting towards the deadline
    Running,
    /// Deadline passed; stays here until restarted or aborted
    Elapsed,
}

/// Interval timeout
///
/// `has_elapsed` latches: once it reports `true` it keeps doing so until
/// [`Timeout::start`] or [`Timeout::abort`] is called. An aborted (or never
/// started) timeout never reports elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout {
    started: Micros,
    duration: Micros,
    phase: Phase,
}

impl Default for Timeout {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeout {
    /// Create an inactive timeout
    pub const fn new() -> Self {
        Self {
            started: Micros::ZERO,
            duration: Micros::ZERO,
            phase: Phase::Inactive,
        }
    }

    /// Arm the timeout to elapse `duration` after `now`
    pub fn start(&mut self, now: Micros, duration: Micros) {
        self.started = now;
        self.duration = duration;
        self.phase = Phase::Running;
    }

    /// Check the deadline
    pub fn has_elapsed(&mut self, now: Micros) -> bool {
        if self.phase == Phase::Running && now.since(self.started) >= self.duration {
            self.phase = Phase::Elapsed;
        }
        self.phase == Phase::Elapsed
    }

    /// Move the deadline to `now`, forcing the timeout to report elapsed
    ///
    /// Has no effect on an inactive (never started or aborted) timeout: a
    /// cleared timeout that was not running stays disarmed, so clearing an
    /// unused heat hold never triggers the inactivity shutdown.
    pub fn clear(&mut self, now: Micros) {
        if self.phase != Phase::Inactive {
            self.started = now;
            self.duration = Micros::ZERO;
            self.phase = Phase::Elapsed;
        }
    }

    /// Disarm until the next [`Timeout::start`]
    pub fn abort(&mut self) {
        self.phase = Phase::Inactive;
    }

    /// Time since the timeout was last started or cleared
    pub fn current_elapsed(&self, now: Micros) -> Micros {
        now.since(self.started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_timeout_never_elapses() {
        let mut t = Timeout::new();
        assert!(!t.has_elapsed(Micros::ZERO));
        assert!(!t.has_elapsed(Micros::MAX));
    }

    #[test]
    fn test_elapses_at_deadline() {
        let mut t = Timeout::new();
        t.start(Micros(1_000), Micros(500));

        assert!(!t.has_elapsed(Micros(1_000)));
        assert!(!t.has_elapsed(Micros(1_499)));
        assert!(t.has_elapsed(Micros(1_500)));
        assert_eq!(t.phase, Phase::Elapsed);
    }

    #[test]
    fn test_elapsed_latches_until_restart() {
        let mut t = Timeout::new();
        t.start(Micros(0), Micros(10));
        assert!(t.has_elapsed(Micros(10)));
        assert!(t.has_elapsed(Micros(11)));

        t.start(Micros(20), Micros(10));
        assert!(!t.has_elapsed(Micros(25)));
    }

    #[test]
    fn test_clear_forces_elapsed() {
        let mut t = Timeout::new();
        t.start(Micros(0), Micros::from_secs(60));
        t.clear(Micros(100));

        assert!(t.has_elapsed(Micros(100)));
        assert_eq!(t.current_elapsed(Micros(150)), Micros(50));
    }

    #[test]
    fn test_clear_does_not_arm_inactive() {
        let mut t = Timeout::new();
        t.clear(Micros(100));
        assert!(!t.has_elapsed(Micros(200)));

        // Aborted behaves like never started
        t.start(Micros(0), Micros(10));
        t.abort();
        t.clear(Micros(300));
        assert!(!t.has_elapsed(Micros(400)));
        assert_eq!(t.phase, Phase::Inactive);
    }

    #[test]
    fn test_clear_then_abort() {
        let mut t = Timeout::new();
        t.start(Micros(0), Micros(10));
        t.clear(Micros(5));
        t.abort();
        assert!(!t.has_elapsed(Micros(1_000_000)));
    }

    #[test]
    fn test_wraparound_near_max() {
        let start = Micros(u64::MAX - 99);
        let mut t = Timeout::new();
        t.start(start, Micros(200));

        // 100 us before wrap, then across it
        assert!(!t.has_elapsed(Micros(u64::MAX)));
        assert!(!t.has_elapsed(Micros(99)));
        assert!(t.has_elapsed(Micros(100)));
    }

    proptest! {
        #[test]
        fn prop_elapses_only_after_duration(
            start in any::<u64>(),
            duration in 1u64..(1u64 << 40),
            before in 0u64..(1u64 << 40),
        ) {
            let mut t = Timeout::new();
            t.start(Micros(start), Micros(duration));

            prop_assert!(!t.has_elapsed(Micros(start)));

            let probe = before % duration;
            prop_assert!(!t.has_elapsed(Micros(start.wrapping_add(probe))));
            prop_assert!(t.has_elapsed(Micros(start.wrapping_add(duration))));
        }

        #[test]
        fn prop_abort_never_elapses(
            start in any::<u64>(),
            duration in 0u64..(1u64 << 40),
            later in proptest::collection::vec(any::<u64>(), 1..16),
        ) {
            let mut t = Timeout::new();
            t.start(Micros(start), Micros(duration));
            t.abort();

            for offset in later {
                prop_assert!(!t.has_elapsed(Micros(start.wrapping_add(offset))));
            }
        }
    }
}
