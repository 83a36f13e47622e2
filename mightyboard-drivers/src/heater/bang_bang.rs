//! Bang-bang heater
//!
//! On/off control with hysteresis. Each management step samples the sensor
//! once; the board reads the cached result between steps.

use mightyboard_core::traits::{Heater, HeaterOutput, SensorError, TemperatureSensor};

/// Bang-bang heater configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BangBangConfig {
    /// Output is forced off at or above this temperature (°C × 10)
    pub cutoff_x10: i16,
    /// Half-width of the regulation band (°C × 10)
    pub hysteresis_x10: i16,
    /// Highest accepted target (°C)
    pub max_target_c: i16,
}

impl BangBangConfig {
    /// Hot end defaults
    pub const EXTRUDER: BangBangConfig = BangBangConfig {
        cutoff_x10: 2_800,
        hysteresis_x10: 20,
        max_target_c: 260,
    };

    /// Heated build platform defaults
    pub const PLATFORM: BangBangConfig = BangBangConfig {
        cutoff_x10: 1_300,
        hysteresis_x10: 10,
        max_target_c: 120,
    };
}

impl Default for BangBangConfig {
    fn default() -> Self {
        Self::EXTRUDER
    }
}

/// Heater regulated by switching its output on and off
pub struct BangBangHeater<S, O> {
    sensor: S,
    output: O,
    config: BangBangConfig,
    target_c: i16,
    /// Temperature when the current target was set
    start_c: Option<i16>,
    /// Last sample (°C × 10)
    last_x10: Result<i16, SensorError>,
    paused: bool,
    disabled: bool,
    /// Output cutoff tripped
    failed: bool,
}

impl<S: TemperatureSensor, O: HeaterOutput> BangBangHeater<S, O> {
    pub fn new(sensor: S, output: O, config: BangBangConfig) -> Self {
        Self {
            sensor,
            output,
            config,
            target_c: 0,
            start_c: None,
            last_x10: Err(SensorError::ConversionError),
            paused: false,
            disabled: false,
            failed: false,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    fn switch(&mut self, on: bool) {
        if self.output.is_on() != on {
            self.output.set_on(on);
        }
    }
}

impl<S: TemperatureSensor, O: HeaterOutput> Heater for BangBangHeater<S, O> {
    fn target_temperature(&self) -> i16 {
        self.target_c
    }

    fn set_target_temperature(&mut self, target_c: i16) {
        self.target_c = target_c.clamp(0, self.config.max_target_c);
        self.start_c = self.current_temperature().ok();
        if self.target_c == 0 {
            self.switch(false);
        }
    }

    fn current_temperature(&self) -> Result<i16, SensorError> {
        self.last_x10.map(|t| t / 10)
    }

    fn delta(&self) -> i16 {
        match (self.current_temperature(), self.start_c) {
            (Ok(now), Some(start)) => (now - start).max(0),
            _ => 0,
        }
    }

    fn is_heating(&self) -> bool {
        self.target_c > 0 && !self.disabled && !self.failed
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn has_failed(&self) -> bool {
        self.failed
    }

    fn disable(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.switch(false);
        }
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn reset(&mut self) {
        self.switch(false);
        self.target_c = 0;
        self.start_c = None;
        self.paused = false;
        self.failed = false;
    }

    fn manage_temperature(&mut self) {
        self.last_x10 = self.sensor.read_celsius_x10();
        let Ok(temp_x10) = self.last_x10 else {
            self.switch(false);
            return;
        };

        if temp_x10 >= self.config.cutoff_x10 {
            self.failed = true;
        }
        if self.failed || self.disabled || self.paused || self.target_c <= 0 {
            self.switch(false);
            return;
        }

        let target_x10 = self.target_c * 10;
        if temp_x10 < target_x10 - self.config.hysteresis_x10 {
            self.switch(true);
        } else if temp_x10 > target_x10 + self.config.hysteresis_x10 {
            self.switch(false);
        }
    }
}
