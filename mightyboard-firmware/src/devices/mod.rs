//! Board collaborators backed by RP2040 peripherals

pub mod feedback;
pub mod heater;
pub mod host;
pub mod motion;
pub mod ui;

pub use feedback::PwmFeedback;
pub use heater::{AdcChannel, RpHeater};
pub use host::HostState;
pub use motion::{AxisMotion, SharedMotion};
pub use ui::ButtonPanel;
