//! Decoded board settings

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::store::{ConfigKey, ConfigStore};
use super::timing::HEAT_HOLD_GRACE;
use crate::clock::Micros;

/// LED strip setting value that switches the strip off
pub const LED_DEFAULT_OFF: u8 = 0;

/// Bit of the axis inversion byte that disables Z holding (active low)
const HOLD_Z_DISABLE_BIT: u8 = 1 << 7;

/// Board settings, decoded from the persisted store on every reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardSettings {
    /// Raw axis inversion bits
    pub axis_inversion: u8,
    /// Keep the Z stepper powered while idle
    pub hold_z: bool,
    /// Only one toolhead installed
    pub single_tool: bool,
    /// Heated build platform installed
    pub hbp_present: bool,
    /// Minutes to keep heating after a cancelled build
    pub heater_timeout_on_cancel_min: u8,
    /// Welcome script has been completed
    pub first_boot_done: bool,
    /// LED strip enabled
    pub led_strip_enabled: bool,
    /// Show heating progress on the LED strip
    pub led_heat_indicator: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            axis_inversion: 0,
            hold_z: true,
            single_tool: true,
            hbp_present: true,
            heater_timeout_on_cancel_min: 0,
            first_boot_done: false,
            led_strip_enabled: false,
            led_heat_indicator: true,
        }
    }
}

impl BoardSettings {
    /// Decode settings from a store
    pub fn load<S: ConfigStore>(store: &S) -> Self {
        let axis_inversion = store.read_byte(ConfigKey::AxisInversion, 0);
        Self {
            axis_inversion,
            hold_z: axis_inversion & HOLD_Z_DISABLE_BIT == 0,
            single_tool: store.read_byte(ConfigKey::ToolCount, 1) == 1,
            hbp_present: store.read_byte(ConfigKey::HbpPresent, 1) != 0,
            heater_timeout_on_cancel_min: store.read_byte(ConfigKey::HeaterTimeoutOnCancel, 0),
            first_boot_done: store.read_byte(ConfigKey::FirstBootFlag, 0) != 0,
            led_strip_enabled: store.read_byte(ConfigKey::LedStripSettings, LED_DEFAULT_OFF)
                != LED_DEFAULT_OFF,
            led_heat_indicator: store.read_byte(ConfigKey::LedHeatIndicator, 1) != 0,
        }
    }

    /// Heat hold timeout armed after a cancelled build
    pub fn restart_timeout(&self) -> Micros {
        Micros::from_minutes(self.heater_timeout_on_cancel_min as u64) + HEAT_HOLD_GRACE
    }

    /// Heaters are shut off right after a cancel (only the grace second)
    pub fn cancel_shuts_heaters_immediately(&self) -> bool {
        self.heater_timeout_on_cancel_min == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConfig;

    #[test]
    fn test_defaults_from_empty_store() {
        let settings = BoardSettings::load(&MockConfig::new());
        assert_eq!(settings, BoardSettings::default());
        assert_eq!(settings.restart_timeout(), Micros::from_secs(1));
        assert!(settings.cancel_shuts_heaters_immediately());
    }

    #[test]
    fn test_hold_z_is_active_low() {
        let mut store = MockConfig::new();
        store.set(ConfigKey::AxisInversion, 0x80 | 0x01);
        let settings = BoardSettings::load(&store);
        assert!(!settings.hold_z);
        assert_eq!(settings.axis_inversion, 0x81);

        store.set(ConfigKey::AxisInversion, 0x01);
        assert!(BoardSettings::load(&store).hold_z);
    }

    #[test]
    fn test_dual_tool_and_timeout() {
        let mut store = MockConfig::new();
        store.set(ConfigKey::ToolCount, 2);
        store.set(ConfigKey::HeaterTimeoutOnCancel, 5);
        store.set(ConfigKey::LedStripSettings, 3);

        let settings = BoardSettings::load(&store);
        assert!(!settings.single_tool);
        assert!(settings.led_strip_enabled);
        assert_eq!(
            settings.restart_timeout(),
            Micros::from_minutes(5) + Micros::from_secs(1)
        );
    }
}
