//! Thermistor heaters on the shared ADC

use embassy_rp::adc::Channel;
use embassy_rp::gpio::Output;

use mightyboard_core::traits::SensorError;
use mightyboard_drivers::heater::{BangBangHeater, GpioHeater};
use mightyboard_drivers::sensor::{AdcReader, Ntc100kSensor};

use crate::shared::ADC;

/// Bang-bang heater with an NTC on one ADC input and a MOSFET on one GPIO
pub type RpHeater = BangBangHeater<Ntc100kSensor<AdcChannel>, GpioHeater<Output<'static>>>;

/// One thermistor input
pub struct AdcChannel {
    channel: Channel<'static>,
}

impl AdcChannel {
    pub fn new(channel: Channel<'static>) -> Self {
        Self { channel }
    }
}

impl AdcReader for AdcChannel {
    fn read(&mut self) -> Result<u16, SensorError> {
        ADC.lock(|adc| {
            let mut adc = adc.borrow_mut();
            let adc = adc.as_mut().ok_or(SensorError::ConversionError)?;
            adc.blocking_read(&mut self.channel)
                .map_err(|_| SensorError::ConversionError)
        })
    }
}
