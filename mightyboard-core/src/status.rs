//! Board status flags
//!
//! Cross-cutting machine states visible to the host and the UI. Written only
//! from the main loop; stored in a single byte so readers in interrupt
//! context always see a consistent set.

use portable_atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

bitflags! {
    /// Set of board states
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BoardStatus: u8 {
        /// Heaters may still be warm from a previous job
        const PREHEATING = 0x01;
        /// Manual jog mode active
        const MANUAL_MODE = 0x02;
        /// Firmware is waiting for a button press
        const WAITING_FOR_BUTTON = 0x04;
        /// Maintenance operation (e.g. filament load) in progress
        const ONBOARD_PROCESS = 0x08;
        /// Onboard script (e.g. welcome script) running
        const ONBOARD_SCRIPT = 0x10;
        /// Build is being cancelled
        const CANCELLING = 0x20;
        /// Heaters were shut off for inactivity
        const HEAT_INACTIVE_SHUTDOWN = 0x40;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BoardStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "BoardStatus({=u8:#04x})", self.bits())
    }
}

/// Status register shared between execution contexts
#[derive(Debug, Default)]
pub struct StatusRegister {
    bits: AtomicU8,
}

impl StatusRegister {
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
        }
    }

    /// Consistent snapshot of all flags
    pub fn get(&self) -> BoardStatus {
        BoardStatus::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Replace the whole set
    pub fn replace(&self, status: BoardStatus) {
        self.bits.store(status.bits(), Ordering::Release);
    }

    /// Set or clear the given flags
    pub fn toggle(&self, flags: BoardStatus, on: bool) {
        let mut status = self.get();
        status.set(flags, on);
        self.replace(status);
    }

    pub fn contains(&self, flags: BoardStatus) -> bool {
        self.get().contains(flags)
    }

    pub fn is_preheating(&self) -> bool {
        self.contains(BoardStatus::PREHEATING)
    }

    pub fn is_onboard_process(&self) -> bool {
        self.contains(BoardStatus::ONBOARD_PROCESS)
    }

    pub fn is_heat_inactive_shutdown(&self) -> bool {
        self.contains(BoardStatus::HEAT_INACTIVE_SHUTDOWN)
    }
}
