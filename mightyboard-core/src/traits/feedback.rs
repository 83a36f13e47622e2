//! Audio / visual feedback trait (piezo and RGB LED strip)

/// Tunes the piezo can play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tone {
    Startup,
    Error,
}

/// RGB colour, one byte per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Inactivity notice colour
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
}

/// Trait for the piezo buzzer and LED strip
pub trait Feedback {
    /// Start playing a tune
    fn play_tone(&mut self, tone: Tone);

    /// Check if a tune is still playing
    fn is_tone_playing(&self) -> bool;

    /// Blink the LED strip in the error pattern
    fn set_error_pattern(&mut self);

    /// Restore the user's configured LED colour
    fn set_default_color(&mut self);

    /// Set the LED strip colour
    ///
    /// `blocking` colours stay until the next explicit colour change.
    fn set_color(&mut self, color: Rgb, blocking: bool);
}
