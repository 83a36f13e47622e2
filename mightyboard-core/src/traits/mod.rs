//! Collaborator traits
//!
//! These traits define the narrow interfaces between the board coordination
//! logic and the subsystems it schedules but does not implement.

pub mod feedback;
pub mod heater;
pub mod host;
pub mod motion;
pub mod ui;

pub use feedback::{Feedback, Rgb, Tone};
pub use heater::{Heater, HeaterOutput, SensorError, TemperatureSensor};
pub use host::{BuildState, HostLink};
pub use motion::{Motion, StepTimer, STEPPER_COUNT};
pub use ui::{InitialScreen, InteractionDevice, Message, ProgressBar, ANY_BUTTON};
