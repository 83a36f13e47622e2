//! Concrete heater collaborators
//!
//! Implementations of the `mightyboard-core` heater traits:
//!
//! - Bang-bang regulated heaters
//! - GPIO heater outputs (MOSFET / SSR)
//! - NTC 100K thermistor sensors

#![no_std]
#![deny(unsafe_code)]

pub mod heater;
pub mod sensor;
