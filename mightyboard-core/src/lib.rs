//! Board-agnostic coordination logic for the mainboard firmware
//!
//! This crate contains everything that decides *when* the hardware
//! subsystems run and *how* failures propagate, independent of the MCU:
//!
//! - Monotonic clock and interval timeouts
//! - Collaborator traits (heaters, interface, motion, host, feedback)
//! - Heater safety monitoring and the heat-fail shutdown state machine
//! - Acknowledgment gate and the cooperative main control slice
//! - Stepper interrupt dispatcher and indicator LED timing
//! - Persisted settings model

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod board;
pub mod clock;
pub mod config;
pub mod heating;
pub mod indicator;
pub mod safety;
pub mod state;
pub mod status;
pub mod stepper;
pub mod timeout;
pub mod traits;

#[cfg(test)]
mod testing;

pub use board::{Board, BoardIo, BoardParts};
pub use clock::{Clock, Micros, TickClock};
pub use status::BoardStatus;
