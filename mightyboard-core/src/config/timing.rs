//! Timing constants for the control loop

use crate::clock::Micros;

/// Microseconds added to the clock per tick (10 kHz tick)
pub const MICROS_PER_TICK: u64 = 100;

/// Tick interrupts between two indicator LED steps
pub const INDICATOR_PRESCALE: u8 = 0xA5;

/// Interval between build platform management steps
pub const PLATFORM_SAMPLE_INTERVAL: Micros = Micros::from_millis(50);

/// Interval between extruder A management steps
///
/// Extruder B runs on the slice following each extruder A step.
pub const EXTRUDER_SAMPLE_INTERVAL: Micros = Micros::from_millis(50);

/// No button activity for this long triggers the inactivity shutdown
pub const USER_INPUT_TIMEOUT: Micros = Micros::from_minutes(30);

/// Added to the configured heater-timeout-on-cancel minutes
pub const HEAT_HOLD_GRACE: Micros = Micros::from_secs(1);
