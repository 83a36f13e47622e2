//! Interaction device trait (LCD + buttons)

use crate::clock::Micros;

/// Screen shown right after reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitialScreen {
    /// First boot: guided setup script
    Welcome,
    /// Regular boot splash
    Splash,
}

/// Messages the board asks the interaction device to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    HeaterFailSoftwareCutoff,
    HeaterFailNotHeating,
    HeaterFailDroppingTemp,
    HeaterFailTempOutOfRange,
    HeaterFailNotPluggedIn,
    HeaterInactivity,
}

impl Message {
    /// Display text
    pub const fn text(self) -> &'static str {
        match self {
            Message::HeaterFailSoftwareCutoff => {
                "Extruder Overheat! Software Cutoff. Restart the bot."
            }
            Message::HeaterFailNotHeating => "Heating Failure! My heater is not heating. Restart.",
            Message::HeaterFailDroppingTemp => {
                "Heating Failure! My temperature dropped unexpectedly. Restart."
            }
            Message::HeaterFailTempOutOfRange => {
                "Heater Error! My temperature reads out of range. Restart."
            }
            Message::HeaterFailNotPluggedIn => {
                "Heater Error! My temperature sensor is not plugged in."
            }
            Message::HeaterInactivity => {
                "Heaters shutdown due to inactivity. Press center to continue."
            }
        }
    }
}

/// Position of the heating progress bar on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgressBar {
    pub line: u8,
    pub start_char: u8,
    pub end_char: u8,
}

impl ProgressBar {
    /// Number of cells the bar spans
    pub fn width(&self) -> u8 {
        self.end_char.saturating_sub(self.start_char)
    }
}

/// Button mask accepting any button
pub const ANY_BUTTON: u8 = 0xFF;

/// Trait for the user interface board
pub trait InteractionDevice {
    /// Check if an interface board is attached
    fn is_connected(&self) -> bool;

    /// Initialize the display and buttons
    fn init(&mut self);

    /// Queue the screen shown after reset
    fn queue_initial_screen(&mut self, screen: InitialScreen);

    /// Leave the current screen
    fn pop_screen(&mut self);

    /// Show an error or notice message
    fn error_message(&mut self, message: Message);

    /// Block menu input until one of the masked buttons is pressed
    fn wait_for_button(&mut self, mask: u8);

    /// Consume a pending press of the awaited button
    ///
    /// Returns `true` at most once per physical press.
    fn button_pushed(&mut self) -> bool;

    /// Dismiss the message, optionally popping its screen
    fn done_with_message(&mut self, pop_screen: bool);

    /// Redraw the current screen
    fn do_update(&mut self);

    /// Scan the buttons
    fn do_interrupt(&mut self);

    /// Any button was pressed since the last call
    fn user_activity(&mut self) -> bool {
        false
    }

    /// Interval between screen redraws
    fn update_rate(&self) -> Micros;

    /// Draw `filled` cells of the heating progress bar
    fn show_heat_progress(&mut self, _bar: ProgressBar, _filled: u8) {}

    /// Blank the heating progress bar
    fn clear_heat_progress(&mut self, _bar: ProgressBar) {}
}
