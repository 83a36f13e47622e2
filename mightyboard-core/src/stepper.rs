//! Stepper interrupt dispatcher
//!
//! Runs once per stepper timer period in interrupt context. The handler
//! masks its own interrupt and lets everything else preempt it while motion
//! advances, so the tick keeps counting during long steps.

use crate::traits::{Motion, StepTimer};

/// Outcome of one stepper interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// User pause; motion untouched
    Paused,
    /// One motion step done
    Stepped,
    /// Step done and the period overran; re-fire requested
    CaughtUp,
}

/// Stepper interrupt handler state
#[derive(Debug, Clone)]
pub struct StepperDispatcher {
    /// Re-fire immediately after an overrun instead of waiting a full period
    catch_up: bool,
    caught_up: u32,
}

impl Default for StepperDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl StepperDispatcher {
    pub const fn new() -> Self {
        Self {
            catch_up: true,
            caught_up: 0,
        }
    }

    pub fn set_catch_up(&mut self, enabled: bool) {
        self.catch_up = enabled;
    }

    pub fn catch_up(&self) -> bool {
        self.catch_up
    }

    /// Overruns recovered since power-on
    pub fn caught_up(&self) -> u32 {
        self.caught_up
    }

    /// Interrupt body
    pub fn on_interrupt<T, M>(&mut self, timer: &mut T, motion: &mut M, paused: bool) -> Dispatch
    where
        T: StepTimer,
        M: Motion,
    {
        if paused {
            return Dispatch::Paused;
        }

        timer.mask();
        timer.allow_nesting();
        motion.advance_step();
        timer.forbid_nesting();
        timer.unmask();

        if self.catch_up && timer.overran() {
            timer.fire_soon();
            self.caught_up = self.caught_up.wrapping_add(1);
            return Dispatch::CaughtUp;
        }
        Dispatch::Stepped
    }
}
