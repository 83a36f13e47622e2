//! Host / command layer trait

/// Build state reported by the host layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuildState {
    #[default]
    Idle,
    /// Building from host commands
    Building,
    /// Building from a file on removable storage
    BuildingFromStorage,
}

impl BuildState {
    /// Check if a build is running from any source
    pub fn is_building(self) -> bool {
        matches!(self, BuildState::Building | BuildState::BuildingFromStorage)
    }
}

/// Trait for the host communication and command processing layer
pub trait HostLink {
    /// Current build state
    fn build_state(&self) -> BuildState;

    /// Cancel the running build
    fn stop_build(&mut self);

    /// Heat failure: stop accepting and processing commands
    fn notify_heat_shutdown(&mut self);

    /// User paused the build
    fn is_paused(&self) -> bool;
}
