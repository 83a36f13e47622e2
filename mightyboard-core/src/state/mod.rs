//! Board state machines
//!
//! The heat-fail orchestrator decides how failures propagate; the
//! interaction gate holds the board until the user acknowledges a message.

pub mod gate;
pub mod shutdown;

pub use gate::InteractionGate;
pub use shutdown::{Announcement, ChannelFailures, HeatFailOrchestrator, ShutdownState};
