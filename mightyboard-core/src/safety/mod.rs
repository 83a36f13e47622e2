//! Heater safety monitoring
//!
//! Classifies heater readings into failure kinds. Failures are polled by the
//! shutdown orchestrator each slice, never pushed.

pub mod failure;
pub mod monitor;

pub use failure::{HeaterChannel, HeaterFailure};
pub use monitor::{HeaterLimits, HeaterMonitor, SafetyStatus, EXTRUDER_LIMITS, PLATFORM_LIMITS};
