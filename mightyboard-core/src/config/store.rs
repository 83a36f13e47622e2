//! Persisted byte store

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keys of the persisted settings consumed by the board
///
/// Each key addresses one byte of the persisted settings image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConfigKey {
    /// Axis inversion bits; bit 7 clear means hold Z between moves
    AxisInversion,
    /// Number of installed toolheads (1 = single tool)
    ToolCount,
    /// Heated build platform installed
    HbpPresent,
    /// Minutes the heaters stay on after a cancelled build
    HeaterTimeoutOnCancel,
    /// Nonzero once the welcome script has been completed
    FirstBootFlag,
    /// LED strip mode; `LED_DEFAULT_OFF` switches the strip off
    LedStripSettings,
    /// Nonzero to show heating progress on the LED strip
    LedHeatIndicator,
}

impl ConfigKey {
    /// Byte offset of the key inside the settings image
    pub const fn offset(self) -> u16 {
        match self {
            ConfigKey::AxisInversion => 0x0002,
            ConfigKey::ToolCount => 0x0042,
            ConfigKey::HbpPresent => 0x004C,
            ConfigKey::FirstBootFlag => 0x0156,
            ConfigKey::LedStripSettings => 0x0140,
            ConfigKey::LedHeatIndicator => 0x0144,
            ConfigKey::HeaterTimeoutOnCancel => 0x0158,
        }
    }

    /// All keys, in offset-independent order
    pub const ALL: [ConfigKey; 7] = [
        ConfigKey::AxisInversion,
        ConfigKey::ToolCount,
        ConfigKey::HbpPresent,
        ConfigKey::HeaterTimeoutOnCancel,
        ConfigKey::FirstBootFlag,
        ConfigKey::LedStripSettings,
        ConfigKey::LedHeatIndicator,
    ];
}

/// Read access to the persisted settings
pub trait ConfigStore {
    /// Read one byte, returning `default` when the byte was never written
    fn read_byte(&self, key: ConfigKey, default: u8) -> u8;
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn read_byte(&self, key: ConfigKey, default: u8) -> u8 {
        (**self).read_byte(key, default)
    }
}
