//! State shared between interrupt-level tasks and the main slice task

use core::cell::RefCell;

use embassy_rp::adc::{Adc, Blocking};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;

use mightyboard_core::indicator::SharedIndicators;
use mightyboard_core::TickClock;

use crate::devices::{AxisMotion, HostState};

/// Monotonic clock, advanced only by the tick task
pub static CLOCK: TickClock = TickClock::new();

/// Debug and interface LED state, stepped by the tick task
pub static INDICATORS: SharedIndicators = SharedIndicators::new();

/// Motion state, stepped by the stepper task and commanded by the board
pub static MOTION: critical_section::Mutex<RefCell<Option<AxisMotion>>> =
    critical_section::Mutex::new(RefCell::new(None));

/// One converter shared by all thermistor channels
pub static ADC: BlockingMutex<CriticalSectionRawMutex, RefCell<Option<Adc<'static, Blocking>>>> =
    BlockingMutex::new(RefCell::new(None));

/// Build state published by the command layer
pub static HOST: HostState = HostState::new();
