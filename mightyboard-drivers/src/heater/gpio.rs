//! GPIO heater output
//!
//! Switches a heater MOSFET or SSR from any `embedded-hal` output pin.

use embedded_hal::digital::OutputPin;
use mightyboard_core::traits::HeaterOutput;

/// Heater switched by a digital output
pub struct GpioHeater<P> {
    pin: P,
    /// Heater on = pin low
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> GpioHeater<P> {
    /// Create the output, switched off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut heater = Self {
            pin,
            inverted,
            on: false,
        };
        heater.set_on(false);
        heater
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> HeaterOutput for GpioHeater<P> {
    fn set_on(&mut self, on: bool) {
        let driven = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        // A pin that failed to switch keeps the last known state
        if driven.is_ok() {
            self.on = on;
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct MockPin {
        high: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
    }

    #[test]
    fn test_active_high_heater() {
        let mut heater = GpioHeater::new_active_high(MockPin { high: true });
        assert!(!heater.is_on());
        assert!(!heater.pin.high);

        heater.set_on(true);
        assert!(heater.is_on());
        assert!(heater.pin.high);

        heater.set_on(false);
        assert!(!heater.pin.high);
    }

    #[test]
    fn test_active_low_heater() {
        let mut heater = GpioHeater::new_active_low(MockPin { high: false });
        assert!(!heater.is_on());
        assert!(heater.pin.high);

        heater.set_on(true);
        assert!(heater.is_on());
        assert!(!heater.release().high);
    }
}
