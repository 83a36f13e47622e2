//! Heating progress feedback
//!
//! While any heater warms up, the LED strip fades from red towards blue and
//! an optional progress bar fills on the display.

use crate::config::BoardSettings;
use crate::traits::{Feedback, Heater, InteractionDevice, ProgressBar, Rgb};

/// Nominal top temperature of an extruder for progress scaling
const EXTRUDER_TOP_C: i32 = 230;
/// Nominal top temperature contribution of the second extruder
const SECOND_EXTRUDER_TOP_C: i32 = 110;
/// Nominal top temperature of the platform
const PLATFORM_TOP_C: i32 = 230;

/// What the progress computation needs from one heater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterSnapshot {
    pub heating: bool,
    pub paused: bool,
    pub set_c: i16,
    pub delta_c: i16,
}

impl HeaterSnapshot {
    pub fn of<H: Heater>(heater: &H) -> Self {
        Self {
            heating: heater.is_heating(),
            paused: heater.is_paused(),
            set_c: heater.target_temperature(),
            delta_c: heater.delta(),
        }
    }
}

/// Combined heating progress of all active heaters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeatProgress {
    pub set_c: i32,
    pub current_c: i32,
    pub div: i32,
}

impl HeatProgress {
    /// Sum up heaters that are heating; the platform counts twice
    pub fn measure(a: HeaterSnapshot, b: HeaterSnapshot, platform: HeaterSnapshot) -> Self {
        let mut set_c = 0i32;
        let mut current_c = 0i32;
        let mut top_c = 0i32;

        if platform.heating {
            current_c += platform.delta_c as i32 * 2;
            set_c += platform.set_c as i32 * 2;
            top_c += PLATFORM_TOP_C;
        }
        if a.heating && !a.paused {
            current_c += a.delta_c as i32;
            set_c += a.set_c as i32;
            top_c += EXTRUDER_TOP_C;
        }
        if b.heating && !b.paused {
            current_c += b.delta_c as i32;
            set_c += b.set_c as i32;
            top_c += SECOND_EXTRUDER_TOP_C;
        }

        let div = if set_c < current_c { top_c - set_c } else { set_c };
        Self {
            set_c,
            current_c,
            div,
        }
    }

    /// LED colour for this progress, if it can be computed
    pub fn led_color(&self) -> Option<Rgb> {
        if self.div == 0 {
            return None;
        }
        let red = 255 * (self.set_c - self.current_c).abs() / self.div;
        let blue = 255 * self.current_c / self.div;
        Some(Rgb::new(clamp_u8(red), 0, clamp_u8(blue)))
    }

    /// Filled cells of a bar `width` cells wide
    pub fn bar_fill(&self, width: u8) -> u8 {
        if self.div <= 0 {
            return 0;
        }
        let fill = (self.set_c - self.current_c).abs() * width as i32 / self.div;
        fill.clamp(0, width as i32) as u8
    }
}

fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// LED and progress bar state for heating feedback
#[derive(Debug, Clone, Default)]
pub struct HeatingAlerts {
    /// LED strip currently shows heating progress
    lights_active: bool,
    /// Active progress bar
    bar: Option<ProgressBar>,
    last_fill: u8,
    progress: HeatProgress,
}

impl HeatingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn lights_active(&self) -> bool {
        self.lights_active
    }

    pub fn start_progress_bar(&mut self, bar: ProgressBar) {
        self.bar = Some(bar);
        self.last_fill = 0;
    }

    pub fn stop_progress_bar<U: InteractionDevice>(&mut self, ui: &mut U) {
        if let Some(bar) = self.bar.take() {
            ui.clear_heat_progress(bar);
        }
    }

    /// Apply a new progress reading; `None` when nothing is heating
    pub fn update<F, U>(
        &mut self,
        progress: Option<HeatProgress>,
        settings: &BoardSettings,
        feedback: &mut F,
        ui: &mut U,
    ) where
        F: Feedback,
        U: InteractionDevice,
    {
        match progress {
            Some(progress) => {
                self.progress = progress;
                if let Some(color) = progress.led_color() {
                    if settings.led_heat_indicator && settings.led_strip_enabled {
                        self.lights_active = true;
                        feedback.set_color(color, false);
                    }
                }
            }
            None => {
                self.progress = HeatProgress::default();
                if self.lights_active {
                    feedback.set_default_color();
                    self.lights_active = false;
                }
            }
        }

        if let Some(bar) = self.bar {
            let fill = self.progress.bar_fill(bar.width());
            if fill < self.last_fill {
                ui.clear_heat_progress(bar);
            }
            ui.show_heat_progress(bar, fill);
            self.last_fill = fill;
        }
    }
}
