//! Settings image loader
//!
//! Reads the settings image from flash once at boot. Erased bytes (0xFF)
//! read as the caller's default, so a blank chip boots with defaults.

use defmt::*;
use embassy_rp::flash::{Blocking, Flash, Error as FlashError};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use mightyboard_core::config::{ConfigKey, ConfigStore};

/// Total flash size of the board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Settings image starts at the last 4 KiB sector
pub const SETTINGS_OFFSET: u32 = (FLASH_SIZE - 4 * 1024) as u32;

/// Bytes of the image covering every known key
const IMAGE_LEN: usize = 0x200;

const ERASED: u8 = 0xFF;

/// In-RAM copy of the settings image
pub struct FlashSettings {
    image: [u8; IMAGE_LEN],
}

impl FlashSettings {
    /// Image with every byte erased
    pub const fn blank() -> Self {
        Self {
            image: [ERASED; IMAGE_LEN],
        }
    }

    /// Read the image from flash, falling back to a blank image
    pub fn load(flash: Peri<'static, FLASH>) -> Self {
        let mut flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(flash);
        let mut settings = Self::blank();

        match Self::read_image(&mut flash, &mut settings.image) {
            Ok(()) => info!("Settings loaded from flash at {:#x}", SETTINGS_OFFSET),
            Err(e) => {
                warn!("Settings read failed ({}), using defaults", Debug2Format(&e));
                settings = Self::blank();
            }
        }
        settings
    }

    fn read_image(
        flash: &mut Flash<'_, FLASH, Blocking, FLASH_SIZE>,
        image: &mut [u8; IMAGE_LEN],
    ) -> Result<(), FlashError> {
        flash.blocking_read(SETTINGS_OFFSET, image)
    }
}

impl ConfigStore for FlashSettings {
    fn read_byte(&self, key: ConfigKey, default: u8) -> u8 {
        match self.image.get(key.offset() as usize) {
            Some(&ERASED) | None => default,
            Some(&byte) => byte,
        }
    }
}
