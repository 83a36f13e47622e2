//! Stepper interrupt task
//!
//! A periodic alarm drives the [`StepperDispatcher`]. When the handler
//! overruns its period the dispatcher re-arms the alarm immediately instead
//! of waiting for the next one.

use defmt::*;
use embassy_time::{Duration, Instant, Timer};

use mightyboard_core::stepper::{Dispatch, StepperDispatcher};
use mightyboard_core::traits::StepTimer;

use crate::devices::SharedMotion;
use crate::shared::HOST;

/// Stepper interrupt period
const STEP_PERIOD: Duration = Duration::from_micros(64);

/// Alarm with a fixed period on the embassy time driver
struct AlarmTimer {
    next: Instant,
    masked: bool,
    nesting: bool,
}

impl AlarmTimer {
    fn new() -> Self {
        Self {
            next: Instant::now() + STEP_PERIOD,
            masked: false,
            nesting: false,
        }
    }

    async fn wait(&mut self) {
        Timer::at(self.next).await;
        self.next += STEP_PERIOD;
    }
}

impl StepTimer for AlarmTimer {
    fn mask(&mut self) {
        self.masked = true;
    }

    fn unmask(&mut self) {
        self.masked = false;
    }

    // Higher-priority interrupts always preempt the executor interrupt; the
    // flag only records the window.
    fn allow_nesting(&mut self) {
        self.nesting = true;
    }

    fn forbid_nesting(&mut self) {
        self.nesting = false;
    }

    fn overran(&self) -> bool {
        Instant::now() >= self.next
    }

    fn fire_soon(&mut self) {
        self.next = Instant::now();
    }
}

#[embassy_executor::task]
pub async fn stepper_task() {
    info!("Stepper task started");

    let mut timer = AlarmTimer::new();
    let mut motion = SharedMotion;
    let mut dispatcher = StepperDispatcher::new();

    loop {
        timer.wait().await;
        let paused = HOST.is_paused();
        if dispatcher.on_interrupt(&mut timer, &mut motion, paused) == Dispatch::CaughtUp {
            let count = dispatcher.caught_up();
            if count.is_power_of_two() {
                debug!("Stepper caught up {} times ({} steps)", count, motion.steps());
            }
        }
    }
}
