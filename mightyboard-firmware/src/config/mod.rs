//! Persisted settings
//!
//! The settings live in an EEPROM-style byte image in the last flash sector.

pub mod loader;

pub use loader::FlashSettings;
