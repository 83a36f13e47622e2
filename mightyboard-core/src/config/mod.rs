//! Configuration
//!
//! Persisted board settings (read byte-wise from an EEPROM-style store) and
//! the compile-time timing constants of the control loop.

pub mod settings;
pub mod store;
pub mod timing;

pub use settings::BoardSettings;
pub use store::{ConfigKey, ConfigStore};
