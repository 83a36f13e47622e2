//! Monotonic microsecond clock
//!
//! The clock is advanced only from the fixed-period tick interrupt and read
//! from everywhere else. All comparisons between timestamps go through
//! wrapping subtraction so that counter wraparound is harmless.

use core::ops::{Add, Sub};

use portable_atomic::{AtomicU64, Ordering};

use crate::config::timing::MICROS_PER_TICK;

/// Point in time or duration, in microseconds
///
/// Arithmetic wraps at the width of the counter. Use [`Micros::since`] to
/// measure how much time passed between two timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Micros(pub u64);

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const MAX: Micros = Micros(u64::MAX);

    #[inline]
    pub const fn from_micros(us: u64) -> Self {
        Micros(us)
    }

    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Micros(ms * 1_000)
    }

    #[inline]
    pub const fn from_secs(s: u64) -> Self {
        Micros(s * 1_000_000)
    }

    #[inline]
    pub const fn from_minutes(min: u64) -> Self {
        Micros(min * 60_000_000)
    }

    #[inline]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, correct across one wrap
    #[inline]
    pub const fn since(self, earlier: Micros) -> Micros {
        Micros(self.0.wrapping_sub(earlier.0))
    }
}

impl Add for Micros {
    type Output = Micros;

    #[inline]
    fn add(self, other: Micros) -> Micros {
        Micros(self.0.wrapping_add(other.0))
    }
}

impl Sub for Micros {
    type Output = Micros;

    #[inline]
    fn sub(self, other: Micros) -> Micros {
        self.since(other)
    }
}

impl From<u64> for Micros {
    #[inline]
    fn from(us: u64) -> Self {
        Micros(us)
    }
}

/// Source of the current time
pub trait Clock {
    /// Read the current timestamp
    ///
    /// Must never observe a half-written value, even when the tick
    /// interrupt fires in the middle of the read.
    fn now(&self) -> Micros;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Micros {
        (**self).now()
    }
}

/// Clock driven by a fixed-period hardware tick
///
/// The counter is the one value that crosses from the tick interrupt into
/// the main loop. It lives in a 64-bit atomic; on cores without native
/// 64-bit atomics `portable-atomic` falls back to a critical section.
pub struct TickClock {
    micros: AtomicU64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub const fn new() -> Self {
        Self {
            micros: AtomicU64::new(0),
        }
    }

    /// Start counting from an arbitrary value (used to test wraparound)
    pub const fn starting_at(start: Micros) -> Self {
        Self {
            micros: AtomicU64::new(start.0),
        }
    }

    /// Advance by one tick period
    ///
    /// Only the tick interrupt may call this.
    #[inline]
    pub fn advance(&self) {
        self.micros.fetch_add(MICROS_PER_TICK, Ordering::Relaxed);
    }

    /// Advance by an arbitrary amount (simulation and tests)
    pub fn advance_by(&self, delta: Micros) {
        self.micros.fetch_add(delta.0, Ordering::Relaxed);
    }
}

impl Clock for TickClock {
    #[inline]
    fn now(&self) -> Micros {
        Micros(self.micros.load(Ordering::Relaxed))
    }
}
