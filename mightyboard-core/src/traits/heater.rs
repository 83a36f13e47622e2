//! Heater and temperature sensor traits

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted to ground
    ShortCircuit,
    /// Reading out of expected range
    OutOfRange,
    /// ADC conversion error
    ConversionError,
}

/// Trait for temperature sensors
///
/// Implementations handle the specific sensor type (NTC thermistor,
/// thermocouple, ...).
pub trait TemperatureSensor {
    /// Read the current temperature in 0.1°C units
    ///
    /// Takes `&mut self` because ADC reads typically require mutable access.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;

    /// Read the current temperature in whole degrees Celsius
    fn read_celsius(&mut self) -> Result<i16, SensorError> {
        self.read_celsius_x10().map(|t| t / 10)
    }
}

/// Trait for heater output control
///
/// Implementations switch the heater element via GPIO, PWM, or SSR.
pub trait HeaterOutput {
    /// Turn the heater on or off
    fn set_on(&mut self, on: bool);

    /// Check if the heater is currently on
    fn is_on(&self) -> bool;
}

/// Closed-loop heater as seen by the board
///
/// The control algorithm and sensor math live behind this trait; the board
/// only schedules [`Heater::manage_temperature`], reads the results and
/// forces targets to zero on shutdown.
pub trait Heater {
    /// Current target temperature in °C (0 = off)
    fn target_temperature(&self) -> i16;

    /// Set the target temperature in °C
    fn set_target_temperature(&mut self, target_c: i16);

    /// Last sampled temperature in °C
    fn current_temperature(&self) -> Result<i16, SensorError>;

    /// Degrees gained since heating towards the current target started
    fn delta(&self) -> i16;

    /// Heater is working towards a nonzero target
    fn is_heating(&self) -> bool;

    /// Heating is paused (e.g. while the platform heats first)
    fn is_paused(&self) -> bool;

    /// Pause or resume heating
    fn set_paused(&mut self, paused: bool);

    /// The heater's own protection tripped (hardware or control cutoff)
    fn has_failed(&self) -> bool;

    /// Permanently disable (uninstalled tool or platform)
    fn disable(&mut self, disabled: bool);

    /// Check if the heater is disabled
    fn is_disabled(&self) -> bool;

    /// Reset control state, clear failures and turn the output off
    fn reset(&mut self);

    /// Sample the sensor and run one control step
    fn manage_temperature(&mut self);
}
