//! Piezo buzzer and RGB LED strip on PWM slices
//!
//! Tunes and the error blink pattern are timed from the board clock; the
//! slice task calls [`PwmFeedback::service`] after every control slice.

use defmt::*;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};

use mightyboard_core::traits::{Feedback, Rgb, Tone};
use mightyboard_core::Micros;

/// System clock feeding the PWM slices
const SYS_CLOCK_HZ: u32 = 125_000_000;

/// Buzzer slice clock divider
const BUZZER_DIVIDER: u8 = 16;

/// (frequency in Hz, 0 = rest; duration in ms)
type Note = (u16, u16);

const STARTUP_TUNE: &[Note] = &[(1_047, 120), (1_319, 120), (1_568, 120), (2_093, 240)];
const ERROR_TUNE: &[Note] = &[(2_093, 150), (0, 60), (1_568, 150), (0, 60), (1_047, 400)];

/// Half period of the error blink
const ERROR_BLINK: Micros = Micros::from_millis(250);

const ERROR_RED: Rgb = Rgb::new(255, 0, 0);
const LED_OFF: Rgb = Rgb::new(0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedMode {
    Steady,
    ErrorBlink { lit: bool, since: Option<Micros> },
}

struct Playback {
    tune: &'static [Note],
    index: usize,
    /// Start of the current note; set on the first service call
    since: Option<Micros>,
}

pub struct PwmFeedback {
    buzzer: Pwm<'static>,
    /// Red on channel A, green on channel B
    red_green: Pwm<'static>,
    blue: Pwm<'static>,
    default_color: Rgb,
    /// A blocking colour stays until the next explicit change
    held: bool,
    led: LedMode,
    playback: Option<Playback>,
}

impl PwmFeedback {
    pub fn new(
        buzzer: Pwm<'static>,
        red_green: Pwm<'static>,
        blue: Pwm<'static>,
        default_color: Rgb,
    ) -> Self {
        let mut feedback = Self {
            buzzer,
            red_green,
            blue,
            default_color,
            held: false,
            led: LedMode::Steady,
            playback: None,
        };
        feedback.silence();
        feedback.write_color(default_color);
        feedback
    }

    /// Advance the tune and the blink pattern
    pub fn service(&mut self, now: Micros) {
        self.service_tune(now);

        if let LedMode::ErrorBlink { lit, since } = self.led {
            let since = since.unwrap_or(now);
            if now.since(since) >= ERROR_BLINK {
                self.write_color(if lit { LED_OFF } else { ERROR_RED });
                self.led = LedMode::ErrorBlink {
                    lit: !lit,
                    since: Some(now),
                };
            } else {
                self.led = LedMode::ErrorBlink {
                    lit,
                    since: Some(since),
                };
            }
        }
    }

    fn service_tune(&mut self, now: Micros) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let Some(&(_, duration_ms)) = playback.tune.get(playback.index) else {
            self.playback = None;
            self.silence();
            return;
        };
        let since = *playback.since.get_or_insert(now);
        if now.since(since) < Micros::from_millis(duration_ms as u64) {
            return;
        }

        playback.index += 1;
        playback.since = Some(now);
        match playback.tune.get(playback.index).copied() {
            Some((freq, _)) => self.sound(freq),
            None => {
                self.playback = None;
                self.silence();
            }
        }
    }

    fn sound(&mut self, freq_hz: u16) {
        if freq_hz == 0 {
            self.silence();
            return;
        }
        let top = SYS_CLOCK_HZ / BUZZER_DIVIDER as u32 / freq_hz as u32;
        let top = top.clamp(2, u16::MAX as u32) as u16;

        let mut config = PwmConfig::default();
        config.divider = BUZZER_DIVIDER.into();
        config.top = top;
        config.compare_a = top / 2;
        self.buzzer.set_config(&config);
    }

    fn silence(&mut self) {
        let mut config = PwmConfig::default();
        config.compare_a = 0;
        self.buzzer.set_config(&config);
    }

    fn write_color(&mut self, color: Rgb) {
        let mut config = PwmConfig::default();
        config.top = u8::MAX as u16;
        config.compare_a = color.r as u16;
        config.compare_b = color.g as u16;
        self.red_green.set_config(&config);

        config.compare_a = color.b as u16;
        config.compare_b = 0;
        self.blue.set_config(&config);
    }
}

impl Feedback for PwmFeedback {
    fn play_tone(&mut self, tone: Tone) {
        debug!("Tone {}", tone);
        let tune = match tone {
            Tone::Startup => STARTUP_TUNE,
            Tone::Error => ERROR_TUNE,
        };
        self.playback = Some(Playback {
            tune,
            index: 0,
            since: None,
        });
        if let Some(&(freq, _)) = tune.first() {
            self.sound(freq);
        }
    }

    fn is_tone_playing(&self) -> bool {
        self.playback.is_some()
    }

    fn set_error_pattern(&mut self) {
        self.held = true;
        self.led = LedMode::ErrorBlink {
            lit: true,
            since: None,
        };
        self.write_color(ERROR_RED);
    }

    fn set_default_color(&mut self) {
        self.held = false;
        self.led = LedMode::Steady;
        let color = self.default_color;
        self.write_color(color);
    }

    fn set_color(&mut self, color: Rgb, blocking: bool) {
        if self.held && !blocking {
            return;
        }
        self.held = blocking;
        self.led = LedMode::Steady;
        self.write_color(color);
    }
}
