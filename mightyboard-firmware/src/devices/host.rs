//! Host link state
//!
//! The command layer publishes its build state here; the board and the
//! stepper task read it.

use defmt::*;
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use mightyboard_core::traits::{BuildState, HostLink};

const IDLE: u8 = 0;
const BUILDING: u8 = 1;
const BUILDING_FROM_STORAGE: u8 = 2;

pub struct HostState {
    build: AtomicU8,
    paused: AtomicBool,
    heat_shutdown: AtomicBool,
}

impl HostState {
    pub const fn new() -> Self {
        Self {
            build: AtomicU8::new(IDLE),
            paused: AtomicBool::new(false),
            heat_shutdown: AtomicBool::new(false),
        }
    }

    pub fn set_build_state(&self, state: BuildState) {
        let raw = match state {
            BuildState::Idle => IDLE,
            BuildState::Building => BUILDING,
            BuildState::BuildingFromStorage => BUILDING_FROM_STORAGE,
        };
        self.build.store(raw, Ordering::Release);
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    pub fn build_state(&self) -> BuildState {
        match self.build.load(Ordering::Acquire) {
            BUILDING => BuildState::Building,
            BUILDING_FROM_STORAGE => BuildState::BuildingFromStorage,
            _ => BuildState::Idle,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Commands must be refused once set
    pub fn is_heat_shutdown(&self) -> bool {
        self.heat_shutdown.load(Ordering::Acquire)
    }
}

impl HostLink for &'static HostState {
    fn build_state(&self) -> BuildState {
        HostState::build_state(self)
    }

    fn stop_build(&mut self) {
        info!("Build stopped from the interface");
        self.set_build_state(BuildState::Idle);
        self.set_paused(false);
    }

    fn notify_heat_shutdown(&mut self) {
        warn!("Heat shutdown: host commands disabled");
        self.heat_shutdown.store(true, Ordering::Release);
        self.set_build_state(BuildState::Idle);
    }

    fn is_paused(&self) -> bool {
        HostState::is_paused(self)
    }
}
