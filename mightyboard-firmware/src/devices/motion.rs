//! Axis drivers shared with the stepper task
//!
//! Pulse planning is not part of this firmware; the motion state tracks the
//! driver enables and the Z hold policy the board commands.

use defmt::*;
use embassy_rp::gpio::Output;

use mightyboard_core::traits::{Motion, STEPPER_COUNT};

use crate::shared::MOTION;

const Z_AXIS: usize = 2;

/// Stepper driver enables (active low)
pub struct AxisMotion {
    enables: [Output<'static>; STEPPER_COUNT],
    hold_z: bool,
    steps: u32,
}

impl AxisMotion {
    pub fn new(enables: [Output<'static>; STEPPER_COUNT]) -> Self {
        let mut motion = Self {
            enables,
            hold_z: false,
            steps: 0,
        };
        for axis in 0..STEPPER_COUNT {
            motion.enable_axis(axis, false);
        }
        motion
    }

    /// Stepper interrupts serviced since boot
    pub fn steps(&self) -> u32 {
        self.steps
    }
}

impl Motion for AxisMotion {
    fn abort(&mut self) {
        info!("Motion aborted");
        for axis in 0..STEPPER_COUNT {
            if axis != Z_AXIS || !self.hold_z {
                self.enable_axis(axis, false);
            }
        }
    }

    fn enable_axis(&mut self, axis: usize, enabled: bool) {
        if let Some(pin) = self.enables.get_mut(axis) {
            if enabled {
                pin.set_low();
            } else {
                pin.set_high();
            }
        }
    }

    fn set_hold_z(&mut self, hold: bool) {
        debug!("Hold Z: {}", hold);
        self.hold_z = hold;
    }

    fn advance_step(&mut self) {
        self.steps = self.steps.wrapping_add(1);
    }
}

/// Handle the board uses to reach the shared [`AxisMotion`]
#[derive(Clone, Copy, Default)]
pub struct SharedMotion;

impl SharedMotion {
    fn with(&self, f: impl FnOnce(&mut AxisMotion)) {
        critical_section::with(|cs| {
            if let Some(motion) = MOTION.borrow_ref_mut(cs).as_mut() {
                f(motion);
            }
        })
    }

    /// Install the motion state; called once before the tasks start
    pub fn install(motion: AxisMotion) {
        critical_section::with(|cs| {
            MOTION.replace(cs, Some(motion));
        });
    }

    pub fn steps(&self) -> u32 {
        critical_section::with(|cs| MOTION.borrow_ref(cs).as_ref().map_or(0, AxisMotion::steps))
    }
}

impl Motion for SharedMotion {
    fn abort(&mut self) {
        self.with(|m| m.abort())
    }

    fn enable_axis(&mut self, axis: usize, enabled: bool) {
        self.with(|m| m.enable_axis(axis, enabled))
    }

    fn set_hold_z(&mut self, hold: bool) {
        self.with(|m| m.set_hold_z(hold))
    }

    fn advance_step(&mut self) {
        self.with(|m| m.advance_step())
    }
}
