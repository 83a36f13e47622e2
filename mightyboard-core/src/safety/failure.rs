//! Heater channels and failure kinds

use crate::traits::Message;

/// One of the three heaters on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaterChannel {
    ExtruderA,
    ExtruderB,
    Platform,
}

impl HeaterChannel {
    pub const ALL: [HeaterChannel; 3] = [
        HeaterChannel::ExtruderA,
        HeaterChannel::ExtruderB,
        HeaterChannel::Platform,
    ];

    /// Index into per-channel arrays
    pub const fn index(self) -> usize {
        match self {
            HeaterChannel::ExtruderA => 0,
            HeaterChannel::ExtruderB => 1,
            HeaterChannel::Platform => 2,
        }
    }

    pub const fn is_extruder(self) -> bool {
        !matches!(self, HeaterChannel::Platform)
    }
}

/// Ways a heater can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaterFailure {
    /// Temperature above the hard cutoff, or the heater's own protection tripped
    SoftwareCutoff,
    /// Heater powered but temperature does not rise
    NotHeating,
    /// Temperature fell far below a target it had reached
    DroppingTemp,
    /// Sensor reading is implausible
    TempOutOfRange,
    /// Sensor reads as disconnected
    NotPluggedIn,
}

impl HeaterFailure {
    /// Message shown for this failure
    pub const fn message(self) -> Message {
        match self {
            HeaterFailure::SoftwareCutoff => Message::HeaterFailSoftwareCutoff,
            HeaterFailure::NotHeating => Message::HeaterFailNotHeating,
            HeaterFailure::DroppingTemp => Message::HeaterFailDroppingTemp,
            HeaterFailure::TempOutOfRange => Message::HeaterFailTempOutOfRange,
            HeaterFailure::NotPluggedIn => Message::HeaterFailNotPluggedIn,
        }
    }

    /// Failure latches the board into shutdown
    ///
    /// Only a missing sensor is dismissible: an unused extruder legitimately
    /// has none.
    pub const fn is_latching(self) -> bool {
        !matches!(self, HeaterFailure::NotPluggedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_has_distinct_message() {
        let kinds = [
            HeaterFailure::SoftwareCutoff,
            HeaterFailure::NotHeating,
            HeaterFailure::DroppingTemp,
            HeaterFailure::TempOutOfRange,
            HeaterFailure::NotPluggedIn,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
            assert_ne!(a.message(), Message::HeaterInactivity);
        }
    }

    #[test]
    fn test_only_not_plugged_in_is_dismissible() {
        assert!(!HeaterFailure::NotPluggedIn.is_latching());
        assert!(HeaterFailure::SoftwareCutoff.is_latching());
        assert!(HeaterFailure::NotHeating.is_latching());
        assert!(HeaterFailure::DroppingTemp.is_latching());
        assert!(HeaterFailure::TempOutOfRange.is_latching());
    }

    #[test]
    fn test_channel_indices() {
        for (i, ch) in HeaterChannel::ALL.iter().enumerate() {
            assert_eq!(ch.index(), i);
        }
        assert!(!HeaterChannel::Platform.is_extruder());
    }
}
