//! Heat-fail shutdown state machine
//!
//! Failures reported by the heater monitors are collected once per slice.
//! A latching failure is announced exactly once and then held until a hard
//! reset. A missing sensor is announced as a dismissible notice at most once
//! per power cycle.

use crate::safety::{HeaterChannel, HeaterFailure};

/// Shutdown state of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutdownState {
    #[default]
    Normal,
    /// Failure accepted, waiting for a quiet moment to announce it
    FailurePending(HeaterFailure),
    /// Announcement ran this slice
    FailureAnnounced(HeaterFailure),
    /// Held until hard reset
    FailureLatched(HeaterFailure),
}

impl ShutdownState {
    /// Failure being handled, if any
    pub fn failure(self) -> Option<HeaterFailure> {
        match self {
            ShutdownState::Normal => None,
            ShutdownState::FailurePending(kind)
            | ShutdownState::FailureAnnounced(kind)
            | ShutdownState::FailureLatched(kind) => Some(kind),
        }
    }
}

/// Latched failure per heater channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelFailures([Option<HeaterFailure>; 3]);

impl ChannelFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, channel: HeaterChannel, failure: Option<HeaterFailure>) {
        self.0[channel.index()] = failure;
    }

    pub fn get(&self, channel: HeaterChannel) -> Option<HeaterFailure> {
        self.0[channel.index()]
    }

    pub fn has_failed(&self, channel: HeaterChannel) -> bool {
        self.get(channel).is_some()
    }

    /// Failure to act on; latching kinds win over a missing sensor
    pub fn most_severe(&self) -> Option<HeaterFailure> {
        let mut found = None;
        for failure in self.0.iter().flatten() {
            if failure.is_latching() {
                return Some(*failure);
            }
            found = Some(*failure);
        }
        found
    }
}

/// What the board has to do for a pending failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Announcement {
    /// Shut down heaters, motion and command processing
    Fatal(HeaterFailure),
    /// Ask the user to acknowledge, zero the failed heaters, carry on
    Dismissible(HeaterFailure),
}

/// Heat-fail orchestrator
#[derive(Debug, Clone, Default)]
pub struct HeatFailOrchestrator {
    state: ShutdownState,
    /// Missing-sensor notice already shown this power cycle
    connection_warned: bool,
}

impl HeatFailOrchestrator {
    pub const fn new() -> Self {
        Self {
            state: ShutdownState::Normal,
            connection_warned: false,
        }
    }

    pub fn state(&self) -> ShutdownState {
        self.state
    }

    /// Heaters are shut down for a failure
    pub fn is_shut_down(&self) -> bool {
        self.state != ShutdownState::Normal
    }

    pub fn failure(&self) -> Option<HeaterFailure> {
        self.state.failure()
    }

    /// Forget everything; power-on only
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Feed the monitors' failures; only acts while `Normal`
    ///
    /// Returns `true` when a failure was accepted.
    pub fn report(&mut self, failures: &ChannelFailures, single_tool: bool) -> bool {
        if self.state != ShutdownState::Normal {
            return false;
        }
        let Some(kind) = failures.most_severe() else {
            return false;
        };

        if kind == HeaterFailure::NotPluggedIn {
            let a = failures.has_failed(HeaterChannel::ExtruderA);
            let b = failures.has_failed(HeaterChannel::ExtruderB);
            let platform = failures.has_failed(HeaterChannel::Platform);

            // A single-tool machine runs with one thermocouple unplugged
            if !platform && single_tool && !(a && b) {
                return false;
            }
            if self.connection_warned {
                return false;
            }
            self.connection_warned = true;
        }

        warn!("heat failure accepted: {}", kind);
        self.state = ShutdownState::FailurePending(kind);
        true
    }

    /// Advance once per slice
    ///
    /// Announces a pending failure unless a tone is still playing; an
    /// announced failure latches on the following slice.
    pub fn step(&mut self, tone_playing: bool) -> Option<Announcement> {
        match self.state {
            ShutdownState::FailureAnnounced(kind) => {
                self.state = ShutdownState::FailureLatched(kind);
                None
            }
            ShutdownState::FailurePending(kind) if !tone_playing => {
                if kind.is_latching() {
                    error!("heat shutdown: {}", kind);
                    self.state = ShutdownState::FailureAnnounced(kind);
                    Some(Announcement::Fatal(kind))
                } else {
                    self.state = ShutdownState::Normal;
                    Some(Announcement::Dismissible(kind))
                }
            }
            _ => None,
        }
    }
}
