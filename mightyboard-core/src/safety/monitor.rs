//! Heater safety monitor implementation
//!
//! Tracks commanded vs. actual temperature of one heater and classifies
//! failures. Runs after every management step of its heater.

use super::failure::{HeaterChannel, HeaterFailure};
use crate::clock::Micros;
use crate::traits::{Heater, SensorError};

/// Safety thresholds for one heater
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterLimits {
    /// Hard upper temperature limit (°C)
    pub cutoff_c: i16,
    /// Consecutive bad sensor readings tolerated
    pub max_bad_readings: u8,
    /// Time allowed to gain `progress_c` while heating
    pub progress_window: Micros,
    /// Minimum gain within `progress_window` (°C)
    pub progress_c: i16,
    /// Within this band of the target counts as reached (°C)
    pub target_band_c: i16,
    /// Drop below a reached target that counts as failure (°C)
    pub drop_c: i16,
}

/// Extruder hot end limits
pub const EXTRUDER_LIMITS: HeaterLimits = HeaterLimits {
    cutoff_c: 280,
    max_bad_readings: 5,
    progress_window: Micros::from_secs(90),
    progress_c: 10,
    target_band_c: 5,
    drop_c: 30,
};

/// Heated build platform limits
pub const PLATFORM_LIMITS: HeaterLimits = HeaterLimits {
    cutoff_c: 130,
    max_bad_readings: 5,
    progress_window: Micros::from_minutes(5),
    progress_c: 5,
    target_band_c: 3,
    drop_c: 20,
};

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(HeaterFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Progress {
    /// No target
    Idle,
    /// Heating towards the target
    Rising { since: Micros, start_c: i16 },
    /// Target reached at least once
    Holding,
}

/// Safety monitor for one heater
#[derive(Debug, Clone)]
pub struct HeaterMonitor {
    channel: HeaterChannel,
    limits: HeaterLimits,
    /// Consecutive failed sensor reads
    bad_readings: u8,
    /// Target seen on the previous observation
    last_target_c: i16,
    progress: Progress,
    /// Latched until `reset`
    failure: Option<HeaterFailure>,
}

impl HeaterMonitor {
    /// Create a monitor for `channel`
    pub fn new(channel: HeaterChannel, limits: HeaterLimits) -> Self {
        Self {
            channel,
            limits,
            bad_readings: 0,
            last_target_c: 0,
            progress: Progress::Idle,
            failure: None,
        }
    }

    /// Create a monitor with the default limits for the channel
    pub fn for_channel(channel: HeaterChannel) -> Self {
        let limits = if channel.is_extruder() {
            EXTRUDER_LIMITS
        } else {
            PLATFORM_LIMITS
        };
        Self::new(channel, limits)
    }

    pub fn channel(&self) -> HeaterChannel {
        self.channel
    }

    /// Forget all history and clear a latched failure
    pub fn reset(&mut self) {
        self.bad_readings = 0;
        self.last_target_c = 0;
        self.progress = Progress::Idle;
        self.failure = None;
    }

    /// Classify the heater's state after a management step
    pub fn observe<H: Heater>(&mut self, now: Micros, heater: &H) -> SafetyStatus {
        if self.failure.is_some() || heater.is_disabled() {
            return self.check();
        }

        if heater.has_failed() {
            self.fail(HeaterFailure::SoftwareCutoff);
            return self.check();
        }

        match heater.current_temperature() {
            Err(err) => self.bad_reading(err),
            Ok(temp_c) => {
                self.bad_readings = 0;
                self.good_reading(now, temp_c, heater);
            }
        }

        self.check()
    }

    /// Current status; failures latch
    pub fn check(&self) -> SafetyStatus {
        match self.failure {
            Some(kind) => SafetyStatus::Fault(kind),
            None => SafetyStatus::Ok,
        }
    }

    /// Latched failure, if any
    pub fn failure(&self) -> Option<HeaterFailure> {
        self.failure
    }

    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    fn bad_reading(&mut self, err: SensorError) {
        self.bad_readings = self.bad_readings.saturating_add(1);
        if self.bad_readings > self.limits.max_bad_readings {
            let kind = match err {
                SensorError::OpenCircuit => HeaterFailure::NotPluggedIn,
                SensorError::ShortCircuit
                | SensorError::OutOfRange
                | SensorError::ConversionError => HeaterFailure::TempOutOfRange,
            };
            self.fail(kind);
        }
    }

    fn good_reading<H: Heater>(&mut self, now: Micros, temp_c: i16, heater: &H) {
        if temp_c > self.limits.cutoff_c {
            self.fail(HeaterFailure::SoftwareCutoff);
            return;
        }

        let target_c = heater.target_temperature();
        let reached = temp_c >= target_c - self.limits.target_band_c;

        if target_c != self.last_target_c {
            self.last_target_c = target_c;
            self.progress = if target_c <= 0 {
                Progress::Idle
            } else if reached {
                Progress::Holding
            } else {
                Progress::Rising {
                    since: now,
                    start_c: temp_c,
                }
            };
            return;
        }

        match self.progress {
            Progress::Idle => {}
            Progress::Rising { since, start_c } => {
                if reached {
                    self.progress = Progress::Holding;
                } else if heater.is_paused() {
                    // Paused heaters are not expected to make progress
                    self.progress = Progress::Rising {
                        since: now,
                        start_c: temp_c,
                    };
                } else if now.since(since) >= self.limits.progress_window {
                    if temp_c - start_c < self.limits.progress_c {
                        self.fail(HeaterFailure::NotHeating);
                    } else {
                        self.progress = Progress::Rising {
                            since: now,
                            start_c: temp_c,
                        };
                    }
                }
            }
            Progress::Holding => {
                if temp_c < target_c - self.limits.drop_c {
                    self.fail(HeaterFailure::DroppingTemp);
                }
            }
        }
    }

    fn fail(&mut self, kind: HeaterFailure) {
        warn!("heater {} failed: {}", self.channel, kind);
        self.failure = Some(kind);
    }
}
