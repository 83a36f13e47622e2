//! Board context
//!
//! [`Board`] owns every collaborator and all coordination state. It is the
//! one object the main loop drives; nothing in here is a global. The tick
//! interrupt only touches the clock and the [`SharedIndicators`].

mod slice;

use crate::clock::{Clock, Micros};
use crate::config::timing::{EXTRUDER_SAMPLE_INTERVAL, PLATFORM_SAMPLE_INTERVAL, USER_INPUT_TIMEOUT};
use crate::config::{BoardSettings, ConfigStore};
use crate::heating::HeatingAlerts;
use crate::indicator::SharedIndicators;
use crate::safety::{HeaterChannel, HeaterMonitor};
use crate::state::{HeatFailOrchestrator, InteractionGate, ShutdownState};
use crate::status::{BoardStatus, StatusRegister};
use crate::timeout::Timeout;
use crate::traits::{
    Feedback, Heater, HostLink, InitialScreen, InteractionDevice, Message, Motion, ProgressBar,
    Tone,
};

/// Collaborator types plugged into a [`Board`]
pub trait BoardIo {
    type Clock: Clock;
    type Extruder: Heater;
    type Platform: Heater;
    type Ui: InteractionDevice;
    type Motion: Motion;
    type Host: HostLink;
    type Feedback: Feedback;
    type Config: ConfigStore;
}

/// Everything a [`Board`] is built from
pub struct BoardParts<'a, B: BoardIo> {
    pub clock: B::Clock,
    pub indicators: &'a SharedIndicators,
    pub extruders: [B::Extruder; 2],
    pub platform: B::Platform,
    pub ui: B::Ui,
    pub motion: B::Motion,
    pub host: B::Host,
    pub feedback: B::Feedback,
    pub config: B::Config,
}

/// Extruder managed on the next staggered slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ExtruderTurn {
    A,
    B,
}

#[derive(Debug, Clone, Default)]
struct Timeouts {
    interface_update: Timeout,
    platform: Timeout,
    extruder_manage: Timeout,
    /// Heaters stay on this long after a cancelled build
    heat_hold: Timeout,
    /// No button activity
    user_input: Timeout,
}

/// Mainboard coordination state
pub struct Board<'a, B: BoardIo> {
    clock: B::Clock,
    indicators: &'a SharedIndicators,
    extruders: [B::Extruder; 2],
    platform: B::Platform,
    monitors: [HeaterMonitor; 3],
    ui: B::Ui,
    motion: B::Motion,
    host: B::Host,
    feedback: B::Feedback,
    config: B::Config,

    settings: BoardSettings,
    status: StatusRegister,
    timeouts: Timeouts,
    restart_timeout: Micros,
    has_interface_board: bool,
    using_platform: bool,

    gate: InteractionGate,
    shutdown: HeatFailOrchestrator,
    extruder_turn: ExtruderTurn,
    alerts: HeatingAlerts,
}

impl<'a, B: BoardIo> Board<'a, B> {
    pub fn new(parts: BoardParts<'a, B>) -> Self {
        let settings = BoardSettings::default();
        Self {
            clock: parts.clock,
            indicators: parts.indicators,
            extruders: parts.extruders,
            platform: parts.platform,
            monitors: HeaterChannel::ALL.map(HeaterMonitor::for_channel),
            ui: parts.ui,
            motion: parts.motion,
            host: parts.host,
            feedback: parts.feedback,
            config: parts.config,
            restart_timeout: settings.restart_timeout(),
            settings,
            status: StatusRegister::new(),
            timeouts: Timeouts::default(),
            has_interface_board: false,
            using_platform: true,
            gate: InteractionGate::new(),
            shutdown: HeatFailOrchestrator::new(),
            extruder_turn: ExtruderTurn::A,
            alerts: HeatingAlerts::new(),
        }
    }

    /// Power-on initialization of heaters and sample timers
    pub fn init(&mut self) {
        self.has_interface_board = self.ui.is_connected();

        for extruder in &mut self.extruders {
            extruder.reset();
        }
        self.platform.reset();
        for monitor in &mut self.monitors {
            monitor.reset();
        }

        let now = self.now();
        self.timeouts
            .extruder_manage
            .start(now, EXTRUDER_SAMPLE_INTERVAL);
        self.timeouts.platform.start(now, PLATFORM_SAMPLE_INTERVAL);
        self.extruder_turn = ExtruderTurn::A;

        info!("board init, interface board: {}", self.has_interface_board);
    }

    /// Reset the board
    ///
    /// Only a hard (power-on) reset clears a heat failure.
    pub fn reset(&mut self, hard: bool) {
        self.indicators.indicate_error(0);

        self.settings = BoardSettings::load(&self.config);
        self.motion.set_hold_z(self.settings.hold_z);
        self.restart_timeout = self.settings.restart_timeout();

        if self.has_interface_board {
            self.ui.init();
            let screen = if self.settings.first_boot_done {
                InitialScreen::Splash
            } else {
                InitialScreen::Welcome
            };
            self.ui.queue_initial_screen(screen);

            let now = self.now();
            let rate = self.ui.update_rate();
            self.timeouts.interface_update.start(now, rate);
        }

        self.indicators.interface_blink(0, 0);

        if hard {
            self.feedback.play_tone(Tone::Startup);
            self.shutdown.clear();
        }

        self.state_reset(hard);

        if self.has_interface_board && self.settings.first_boot_done {
            self.ui.pop_screen();
        }

        info!("board reset (hard: {})", hard);
    }

    /// Reset the state needed for printing
    pub fn state_reset(&mut self, hard: bool) {
        self.status.replace(BoardStatus::PREHEATING);

        self.extruders[1].disable(self.settings.single_tool);
        self.platform.disable(!self.settings.hbp_present);

        self.reset_user_input_timeout();
        if !hard {
            self.reset_heat_hold_timeout();
        }

        self.feedback.set_default_color();
        self.gate.clear();
        self.alerts.reset();
    }

    /// Restart the user input timeout from zero
    pub fn reset_user_input_timeout(&mut self) {
        let now = self.now();
        self.timeouts.user_input.start(now, USER_INPUT_TIMEOUT);
    }

    /// Restart the heat hold timeout from zero
    pub fn reset_heat_hold_timeout(&mut self) {
        let now = self.now();
        self.timeouts.heat_hold.start(now, self.restart_timeout);
    }

    /// Stop the heat hold timeout so heat is not held until the next build
    pub fn abort_heat_hold_timeout(&mut self) {
        let now = self.now();
        self.timeouts.heat_hold.clear(now);
        self.timeouts.heat_hold.abort();
    }

    /// Show `message` and hold until the user presses a button
    pub fn request_acknowledgment(&mut self, message: Message, reset_on_ack: bool, pop_screen: bool) {
        self.gate.request(
            message,
            reset_on_ack,
            pop_screen,
            &mut self.ui,
            &mut self.feedback,
            self.indicators,
        );
    }

    pub fn set_board_status(&self, flags: BoardStatus, on: bool) {
        self.status.toggle(flags, on);
    }

    pub fn board_status(&self) -> BoardStatus {
        self.status.get()
    }

    /// Any heater is working towards a target
    pub fn is_heating(&self) -> bool {
        self.extruders.iter().any(|e| e.is_heating()) || self.platform.is_heating()
    }

    pub fn set_using_platform(&mut self, using: bool) {
        self.using_platform = using;
    }

    pub fn is_using_platform(&self) -> bool {
        self.using_platform
    }

    pub fn start_progress_bar(&mut self, line: u8, start_char: u8, end_char: u8) {
        self.alerts.start_progress_bar(ProgressBar {
            line,
            start_char,
            end_char,
        });
    }

    pub fn stop_progress_bar(&mut self) {
        self.alerts.stop_progress_bar(&mut self.ui);
    }

    /// Blink `code` on the debug LED
    pub fn indicate_error(&self, code: u8) {
        self.indicators.indicate_error(code);
    }

    pub fn current_error(&self) -> u8 {
        self.indicators.current_error()
    }

    pub fn interface_blink(&self, on: u8, off: u8) {
        self.indicators.interface_blink(on, off);
    }

    pub fn now(&self) -> Micros {
        self.clock.now()
    }

    pub fn clock(&self) -> &B::Clock {
        &self.clock
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn has_interface_board(&self) -> bool {
        self.has_interface_board
    }

    pub fn shutdown_state(&self) -> ShutdownState {
        self.shutdown.state()
    }

    /// Heaters are shut down for a heater failure
    pub fn is_heat_shutdown(&self) -> bool {
        self.shutdown.is_shut_down()
    }

    pub fn is_waiting_for_button(&self) -> bool {
        self.gate.is_waiting()
    }

    pub fn monitor(&self, channel: HeaterChannel) -> &HeaterMonitor {
        &self.monitors[channel.index()]
    }

    pub fn extruder(&self, index: usize) -> Option<&B::Extruder> {
        self.extruders.get(index)
    }

    pub fn extruder_mut(&mut self, index: usize) -> Option<&mut B::Extruder> {
        self.extruders.get_mut(index)
    }

    pub fn platform(&self) -> &B::Platform {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut B::Platform {
        &mut self.platform
    }

    pub fn ui(&self) -> &B::Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut B::Ui {
        &mut self.ui
    }

    pub fn motion(&self) -> &B::Motion {
        &self.motion
    }

    pub fn host(&self) -> &B::Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut B::Host {
        &mut self.host
    }

    pub fn feedback(&self) -> &B::Feedback {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut B::Feedback {
        &mut self.feedback
    }

    fn target(&self, channel: HeaterChannel) -> i16 {
        match channel {
            HeaterChannel::ExtruderA => self.extruders[0].target_temperature(),
            HeaterChannel::ExtruderB => self.extruders[1].target_temperature(),
            HeaterChannel::Platform => self.platform.target_temperature(),
        }
    }

    fn set_target(&mut self, channel: HeaterChannel, target_c: i16) {
        match channel {
            HeaterChannel::ExtruderA => self.extruders[0].set_target_temperature(target_c),
            HeaterChannel::ExtruderB => self.extruders[1].set_target_temperature(target_c),
            HeaterChannel::Platform => self.platform.set_target_temperature(target_c),
        }
    }

    fn any_target_set(&self) -> bool {
        HeaterChannel::ALL.iter().any(|&ch| self.target(ch) > 0)
    }

    fn zero_all_targets(&mut self) {
        for channel in HeaterChannel::ALL {
            self.set_target(channel, 0);
        }
    }
}
