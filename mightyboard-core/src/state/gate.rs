//! Modal "press a button to continue" condition
//!
//! The wait is polled once per slice; nothing blocks.

use crate::indicator::SharedIndicators;
use crate::traits::{Feedback, HostLink, InteractionDevice, Message, Tone, ANY_BUTTON};

/// Interface LED blink pattern while waiting for the user
const WAIT_BLINK_ON: u8 = 25;
const WAIT_BLINK_OFF: u8 = 15;

/// Pending acknowledgment request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InteractionGate {
    waiting: bool,
    /// Stop the running build once acknowledged
    reset_on_ack: bool,
    /// Leave the message screen once acknowledged
    pop_screen_on_ack: bool,
}

impl Default for InteractionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionGate {
    pub const fn new() -> Self {
        Self {
            waiting: false,
            reset_on_ack: false,
            pop_screen_on_ack: true,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn reset_on_ack(&self) -> bool {
        self.reset_on_ack
    }

    pub fn pop_screen_on_ack(&self) -> bool {
        self.pop_screen_on_ack
    }

    /// Drop any pending wait
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Show `message` and wait for any button
    pub fn request<U, F>(
        &mut self,
        message: Message,
        reset_on_ack: bool,
        pop_screen_on_ack: bool,
        ui: &mut U,
        feedback: &mut F,
        indicators: &SharedIndicators,
    ) where
        U: InteractionDevice,
        F: Feedback,
    {
        info!("waiting for acknowledgment: {}", message);
        self.reset_on_ack = reset_on_ack;
        self.pop_screen_on_ack = pop_screen_on_ack;
        ui.error_message(message);

        indicators.interface_blink(WAIT_BLINK_ON, WAIT_BLINK_OFF);
        ui.wait_for_button(ANY_BUTTON);
        self.waiting = true;

        feedback.play_tone(Tone::Error);
    }

    /// Serve at most one button press
    ///
    /// Returns `true` when the wait was acknowledged by this call.
    pub fn poll<U, F, H>(
        &mut self,
        ui: &mut U,
        feedback: &mut F,
        host: &mut H,
        indicators: &SharedIndicators,
    ) -> bool
    where
        U: InteractionDevice,
        F: Feedback,
        H: HostLink,
    {
        if !self.waiting || !ui.button_pushed() {
            return false;
        }

        indicators.interface_blink(0, 0);
        feedback.set_default_color();

        self.waiting = false;
        ui.done_with_message(self.pop_screen_on_ack);
        self.pop_screen_on_ack = true;

        if self.reset_on_ack {
            info!("acknowledged, stopping build");
            host.stop_build();
        } else {
            info!("acknowledged");
        }
        true
    }
}
