//! NTC 100K thermistor sensor
//!
//! Standard hot-end and build-platform thermistor (100 kΩ at 25 °C,
//! B = 3950). Integer-only conversion through a lookup table.

use mightyboard_core::traits::{SensorError, TemperatureSensor};

/// Resistance table: (ohms, °C × 10), decreasing resistance
///
/// Beta equation with R0 = 100 kΩ at 25 °C and B = 3950, 0 °C to 300 °C.
const TEMP_TABLE: &[(u32, i16)] = &[
    (336_206, 0),
    (201_746, 100),
    (125_353, 200),
    (100_000, 250),
    (80_371, 300),
    (53_015, 400),
    (35_882, 500),
    (24_862, 600),
    (17_598, 700),
    (12_703, 800),
    (9_336, 900),
    (6_975, 1000),
    (5_291, 1100),
    (4_071, 1200),
    (3_173, 1300),
    (2_503, 1400),
    (1_997, 1500),
    (1_610, 1600),
    (1_310, 1700),
    (1_076, 1800),
    (892, 1900),
    (745, 2000),
    (626, 2100),
    (531, 2200),
    (453, 2300),
    (388, 2400),
    (335, 2500),
    (291, 2600),
    (254, 2700),
    (223, 2800),
    (196, 2900),
    (174, 3000),
];

/// Raw counts within this distance of either rail count as a wiring fault
const RAIL_MARGIN: u16 = 10;

/// One ADC channel
pub trait AdcReader {
    /// Read a raw conversion result
    fn read(&mut self) -> Result<u16, SensorError>;
}

/// NTC 100K thermistor in a pull-up divider
///
/// Circuit: VCC -- pull-up -- ADC pin -- NTC -- GND
pub struct Ntc100kSensor<ADC> {
    adc: ADC,
    pullup_ohms: u32,
    /// Full-scale ADC count (4096 for 12 bit)
    adc_max: u16,
}

impl<ADC> Ntc100kSensor<ADC> {
    /// Sensor on a 12-bit ADC with the given pull-up
    pub fn new(adc: ADC, pullup_ohms: u32) -> Self {
        Self::with_resolution(adc, pullup_ohms, 12)
    }

    pub fn with_resolution(adc: ADC, pullup_ohms: u32, bits: u8) -> Self {
        Self {
            adc,
            pullup_ohms,
            adc_max: 1 << bits.min(15),
        }
    }

    /// Convert a raw ADC count to thermistor resistance
    pub fn adc_to_resistance(&self, adc_value: u16) -> Result<u32, SensorError> {
        // Sensor missing: the pull-up drags the pin to the rail
        if adc_value >= self.adc_max.saturating_sub(RAIL_MARGIN) {
            return Err(SensorError::OpenCircuit);
        }
        if adc_value < RAIL_MARGIN {
            return Err(SensorError::ShortCircuit);
        }

        let numerator = self.pullup_ohms as u64 * adc_value as u64;
        let denominator = (self.adc_max - adc_value) as u64;
        Ok((numerator / denominator) as u32)
    }

    /// Temperature in 0.1 °C for a resistance, interpolated linearly
    pub fn resistance_to_temp_x10(resistance: u32) -> Result<i16, SensorError> {
        let (coldest, _) = TEMP_TABLE[0];
        let (hottest, _) = TEMP_TABLE[TEMP_TABLE.len() - 1];
        if resistance > coldest || resistance < hottest {
            return Err(SensorError::OutOfRange);
        }

        for pair in TEMP_TABLE.windows(2) {
            let (r_high, t_low) = pair[0];
            let (r_low, t_high) = pair[1];

            if resistance <= r_high && resistance >= r_low {
                let r_range = (r_high - r_low) as i32;
                let t_range = (t_high - t_low) as i32;
                let r_offset = (r_high - resistance) as i32;
                return Ok(t_low + (t_range * r_offset / r_range) as i16);
            }
        }

        Err(SensorError::OutOfRange)
    }
}

impl<ADC: AdcReader> TemperatureSensor for Ntc100kSensor<ADC> {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        let adc_value = self.adc.read()?;
        let resistance = self.adc_to_resistance(adc_value)?;
        Self::resistance_to_temp_x10(resistance)
    }
}
