//! Board collaborator set for this hardware

use mightyboard_core::{Board, BoardIo, TickClock};

use crate::config::FlashSettings;
use crate::devices::{ButtonPanel, HostState, PwmFeedback, RpHeater, SharedMotion};

pub struct RpIo;

impl BoardIo for RpIo {
    type Clock = &'static TickClock;
    type Extruder = RpHeater;
    type Platform = RpHeater;
    type Ui = ButtonPanel;
    type Motion = SharedMotion;
    type Host = &'static HostState;
    type Feedback = PwmFeedback;
    type Config = FlashSettings;
}

pub type FirmwareBoard = Board<'static, RpIo>;
