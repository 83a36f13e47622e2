//! Motion subsystem and stepper timer traits

/// Number of stepper axes (X, Y, Z, A, B)
pub const STEPPER_COUNT: usize = 5;

/// Trait for the motion subsystem
///
/// The pulse generation algorithm lives behind this trait.
pub trait Motion {
    /// Stop all motion and drop queued moves
    fn abort(&mut self);

    /// Power or release one axis
    fn enable_axis(&mut self, axis: usize, enabled: bool);

    /// Keep the Z axis powered while idle
    fn set_hold_z(&mut self, hold: bool);

    /// Advance motion by one stepper interrupt period
    fn advance_step(&mut self);
}

impl<M: Motion + ?Sized> Motion for &mut M {
    fn abort(&mut self) {
        (**self).abort()
    }

    fn enable_axis(&mut self, axis: usize, enabled: bool) {
        (**self).enable_axis(axis, enabled)
    }

    fn set_hold_z(&mut self, hold: bool) {
        (**self).set_hold_z(hold)
    }

    fn advance_step(&mut self) {
        (**self).advance_step()
    }
}

/// Compare-match timer driving the stepper interrupt
pub trait StepTimer {
    /// Mask the stepper compare interrupt (prevents re-entry)
    fn mask(&mut self);

    /// Unmask the stepper compare interrupt
    fn unmask(&mut self);

    /// Let other interrupts preempt the running handler
    fn allow_nesting(&mut self);

    /// Stop other interrupts from preempting the running handler
    fn forbid_nesting(&mut self);

    /// The counter already passed the next compare value
    fn overran(&self) -> bool;

    /// Restart the period so the interrupt fires again right away
    fn fire_soon(&mut self);
}
