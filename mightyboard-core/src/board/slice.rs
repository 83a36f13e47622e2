//! Main control slice
//!
//! One call does at most one share of each kind of work. Interface refresh,
//! platform management and extruder management are staggered so that no
//! single slice runs all of them.

use super::{Board, BoardIo, ExtruderTurn};
use crate::clock::Micros;
use crate::config::timing::{EXTRUDER_SAMPLE_INTERVAL, PLATFORM_SAMPLE_INTERVAL, USER_INPUT_TIMEOUT};
use crate::heating::{HeatProgress, HeaterSnapshot};
use crate::safety::{HeaterChannel, HeaterFailure, SafetyStatus};
use crate::state::{Announcement, ChannelFailures};
use crate::status::BoardStatus;
use crate::traits::{
    Feedback, Heater, HostLink, InteractionDevice, Message, Motion, Rgb, Tone, STEPPER_COUNT,
};

/// Interface LED pattern for a heater failure
const FAILURE_BLINK_ON: u8 = 10;
const FAILURE_BLINK_OFF: u8 = 10;

impl<'a, B: BoardIo> Board<'a, B> {
    /// Run one slice of the main loop
    pub fn run_slice(&mut self) {
        let now = self.now();

        let mut interface_updated = false;
        if self.has_interface_board {
            self.ui.do_interrupt();
            if self.ui.user_activity() {
                self.reset_user_input_timeout();
            }
            if self.timeouts.interface_update.has_elapsed(now) {
                self.ui.do_update();
                let rate = self.ui.update_rate();
                self.timeouts.interface_update.start(now, rate);
                interface_updated = true;
            }
        }

        if self.using_platform && self.timeouts.platform.has_elapsed(now) {
            self.platform.manage_temperature();
            self.observe(HeaterChannel::Platform, now);
            self.timeouts.platform.start(now, PLATFORM_SAMPLE_INTERVAL);
        }

        if self.gate.is_waiting() {
            self.gate.poll(
                &mut self.ui,
                &mut self.feedback,
                &mut self.host,
                self.indicators,
            );
        }

        // Maintenance operations keep their heat
        if self.timeouts.heat_hold.has_elapsed(now) && self.status.is_onboard_process() {
            debug!("heat hold elapsed during onboard process");
            self.abort_heat_hold_timeout();
        }

        let heat_hold_elapsed = self.timeouts.heat_hold.has_elapsed(now);
        let user_input_elapsed = self.timeouts.user_input.has_elapsed(now);
        if (heat_hold_elapsed || user_input_elapsed)
            && !self.shutdown.is_shut_down()
            && !self.host.build_state().is_building()
        {
            self.inactivity_shutdown(now, heat_hold_elapsed);
        }

        match self.shutdown.step(self.feedback.is_tone_playing()) {
            Some(Announcement::Fatal(kind)) => self.announce_failure(kind),
            Some(Announcement::Dismissible(kind)) => {
                self.announce_notice(kind);
                return;
            }
            None => {}
        }

        if !interface_updated {
            self.manage_extruders(now);
        }
    }

    /// Run one extruder, alternating between A and B
    fn manage_extruders(&mut self, now: Micros) {
        match self.extruder_turn {
            ExtruderTurn::A => {
                if self.timeouts.extruder_manage.has_elapsed(now) {
                    self.extruders[0].manage_temperature();
                    self.observe(HeaterChannel::ExtruderA, now);
                    self.heating_alerts();
                    self.timeouts
                        .extruder_manage
                        .start(now, EXTRUDER_SAMPLE_INTERVAL);
                    self.extruder_turn = ExtruderTurn::B;
                }
            }
            ExtruderTurn::B => {
                self.extruders[1].manage_temperature();
                self.observe(HeaterChannel::ExtruderB, now);
                self.extruder_turn = ExtruderTurn::A;
            }
        }
    }

    /// Classify a heater after its management step
    fn observe(&mut self, channel: HeaterChannel, now: Micros) {
        let index = channel.index();
        let status = match channel {
            HeaterChannel::ExtruderA | HeaterChannel::ExtruderB => {
                self.monitors[index].observe(now, &self.extruders[index])
            }
            HeaterChannel::Platform => self.monitors[index].observe(now, &self.platform),
        };

        if let SafetyStatus::Fault(_) = status {
            let mut failures = ChannelFailures::new();
            for monitor in &self.monitors {
                failures.set(monitor.channel(), monitor.failure());
            }
            if !self.shutdown.report(&failures, self.settings.single_tool) {
                debug!("heater {} failure not escalated", channel);
            }
        }
    }

    /// Heaters sat idle too long: switch them off
    fn inactivity_shutdown(&mut self, now: Micros, heat_hold_elapsed: bool) {
        self.status.toggle(BoardStatus::HEAT_INACTIVE_SHUTDOWN, true);
        self.status.toggle(BoardStatus::PREHEATING, false);

        // Right after a cancel with no hold time the heaters go off silently
        let quiet_cancel = self.settings.cancel_shuts_heaters_immediately()
            && self.timeouts.user_input.current_elapsed(now) < USER_INPUT_TIMEOUT;

        if self.any_target_set() && !quiet_cancel {
            info!("heaters shut down for inactivity");
            self.request_acknowledgment(Message::HeaterInactivity, false, true);
            self.feedback.set_color(Rgb::BLUE, true);
        }

        self.zero_all_targets();

        self.timeouts.user_input.abort();
        if heat_hold_elapsed {
            self.abort_heat_hold_timeout();
        }
    }

    /// Latching failure: stop heaters, motion and command processing
    fn announce_failure(&mut self, kind: HeaterFailure) {
        self.indicators
            .interface_blink(FAILURE_BLINK_ON, FAILURE_BLINK_OFF);
        self.ui.error_message(kind.message());

        self.zero_all_targets();

        self.feedback.play_tone(Tone::Error);
        self.feedback.set_error_pattern();

        self.host.notify_heat_shutdown();
        self.motion.abort();
        for axis in 0..STEPPER_COUNT {
            self.motion.enable_axis(axis, false);
        }
    }

    /// Dismissible failure: switch off only the failed heaters
    fn announce_notice(&mut self, kind: HeaterFailure) {
        info!("heater notice: {}", kind);
        self.indicators
            .interface_blink(FAILURE_BLINK_ON, FAILURE_BLINK_OFF);
        self.request_acknowledgment(kind.message(), false, true);

        for channel in HeaterChannel::ALL {
            if self.monitors[channel.index()].has_failed() {
                self.set_target(channel, 0);
            }
        }
    }

    /// Update the LED strip and progress bar from the heating progress
    fn heating_alerts(&mut self) {
        let progress = if self.is_heating() {
            if !self.platform.is_heating() {
                for extruder in &mut self.extruders {
                    if extruder.is_paused() {
                        extruder.set_paused(false);
                    }
                }
            }
            Some(HeatProgress::measure(
                HeaterSnapshot::of(&self.extruders[0]),
                HeaterSnapshot::of(&self.extruders[1]),
                HeaterSnapshot::of(&self.platform),
            ))
        } else {
            None
        };

        self.alerts
            .update(progress, &self.settings, &mut self.feedback, &mut self.ui);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigKey;
    use crate::indicator::{InterfaceMode, SharedIndicators};
    use crate::state::ShutdownState;
    use crate::testing::{mock_board, FeedbackEvent, MockBoard, UiEvent};
    use crate::traits::{BuildState, SensorError};

    fn booted(indicators: &SharedIndicators) -> MockBoard<'_> {
        let mut board = mock_board(indicators, |_| {});
        board.init();
        board.reset(true);
        board
    }

    fn count_ui(board: &MockBoard<'_>, event: UiEvent) -> usize {
        board.ui().events.iter().filter(|e| **e == event).count()
    }

    fn count_feedback(board: &MockBoard<'_>, event: FeedbackEvent) -> usize {
        board.feedback().events.iter().filter(|e| **e == event).count()
    }

    #[test]
    fn test_round_robin_extruders() {
        let indicators = SharedIndicators::new();
        let mut board = mock_board(&indicators, |io| io.ui.connected = false);
        board.init();
        board.reset(true);

        // Every slice is past the extruder interval
        let mut order = heapless::Vec::<u8, 64>::new();
        for _ in 0..40 {
            board.clock().advance_by(EXTRUDER_SAMPLE_INTERVAL);
            let before = [board.ex(0).manage_calls, board.ex(1).manage_calls];
            board.run_slice();
            if board.ex(0).manage_calls > before[0] {
                let _ = order.push(0);
            }
            if board.ex(1).manage_calls > before[1] {
                let _ = order.push(1);
            }
        }

        assert_eq!(order.len(), 40);
        assert_eq!(board.ex(0).manage_calls, 20);
        assert_eq!(board.ex(1).manage_calls, 20);
        for pair in order.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_extruders_skip_interface_refresh_slices() {
        let indicators = SharedIndicators::new();
        // Every slice refreshes the interface
        let mut board = mock_board(&indicators, |io| io.ui.rate = Micros::ZERO);
        board.init();
        board.reset(true);

        for _ in 0..10 {
            board.clock().advance_by(EXTRUDER_SAMPLE_INTERVAL);
            board.run_slice();
        }
        assert_eq!(board.ex(0).manage_calls, 0);
        assert_eq!(board.ex(1).manage_calls, 0);
        assert_eq!(board.ui().updates, 10);
    }

    #[test]
    fn test_platform_managed_on_interval() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);

        board.run_slices_for(Micros::from_secs(1));
        let calls = board.platform().manage_calls;
        assert!((19..=21).contains(&calls), "platform ran {} times", calls);

        board.set_using_platform(false);
        board.run_slices_for(Micros::from_secs(1));
        assert_eq!(board.platform().manage_calls, calls);
    }

    #[test]
    fn test_latching_failure_shuts_down_once() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.ex(0).target = 220;
        board.ex(1).target = 200;
        board.platform_mut().target = 100;
        board.ex(0).reading = Ok(300);

        board.run_slices_for(Micros::from_secs(1));

        assert_eq!(
            board.shutdown_state(),
            ShutdownState::FailureLatched(HeaterFailure::SoftwareCutoff)
        );
        assert_eq!(board.ex(0).target, 0);
        assert_eq!(board.ex(1).target, 0);
        assert_eq!(board.platform().target, 0);
        assert!(board.motion().aborted);
        assert!(board.motion().enabled.iter().all(|&e| !e));
        assert_eq!(board.host().heat_shutdowns, 1);
        assert_eq!(indicators.interface_mode(), InterfaceMode::Blink { on: 10, off: 10 });

        // More slices repeat nothing
        board.run_slices_for(Micros::from_secs(10));
        assert_eq!(count_feedback(&board, FeedbackEvent::Tone(Tone::Error)), 1);
        assert_eq!(count_feedback(&board, FeedbackEvent::ErrorPattern), 1);
        assert_eq!(
            count_ui(&board, UiEvent::Error(Message::HeaterFailSoftwareCutoff)),
            1
        );
        assert_eq!(board.host().heat_shutdowns, 1);
    }

    /// Drive extruder A into `kind`; the other heaters keep their targets
    fn fail_extruder(board: &mut MockBoard<'_>, kind: HeaterFailure) {
        board.ex(0).target = 220;
        board.ex(1).target = 200;
        board.platform_mut().target = 100;

        match kind {
            HeaterFailure::NotHeating => {
                board.ex(0).stalled = true;
                board.run_slices_for(Micros::from_secs(91));
            }
            HeaterFailure::DroppingTemp => {
                board.ex(0).reading = Ok(220);
                board.ex(0).stalled = true;
                board.run_slices_for(Micros::from_secs(1));
                board.ex(0).reading = Ok(180);
                board.run_slices_for(Micros::from_secs(1));
            }
            HeaterFailure::TempOutOfRange => {
                board.ex(0).reading = Err(SensorError::ShortCircuit);
                board.run_slices_for(Micros::from_secs(1));
            }
            HeaterFailure::SoftwareCutoff | HeaterFailure::NotPluggedIn => {
                unreachable!("not driven by this helper")
            }
        }
    }

    #[test]
    fn test_every_latching_kind_shuts_down() {
        for kind in [
            HeaterFailure::NotHeating,
            HeaterFailure::DroppingTemp,
            HeaterFailure::TempOutOfRange,
        ] {
            let indicators = SharedIndicators::new();
            let mut board = booted(&indicators);
            fail_extruder(&mut board, kind);
            board.run_slices_for(Micros::from_secs(2));

            assert_eq!(board.shutdown_state(), ShutdownState::FailureLatched(kind));
            assert_eq!(count_ui(&board, UiEvent::Error(kind.message())), 1, "{:?}", kind);
            assert_eq!(board.ex(0).target, 0, "{:?}", kind);
            assert_eq!(board.ex(1).target, 0, "{:?}", kind);
            assert_eq!(board.platform().target, 0, "{:?}", kind);
            assert!(board.motion().enabled.iter().all(|&e| !e), "{:?}", kind);
            assert_eq!(
                count_feedback(&board, FeedbackEvent::Tone(Tone::Error)),
                1,
                "{:?}",
                kind
            );
            assert_eq!(board.host().heat_shutdowns, 1, "{:?}", kind);
        }
    }

    #[test]
    fn test_announcement_waits_for_tone() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.feedback_mut().tone_playing = true;
        board.platform_mut().reading = Ok(200);

        board.run_slices_for(Micros::from_secs(1));
        assert_eq!(
            board.shutdown_state(),
            ShutdownState::FailurePending(HeaterFailure::SoftwareCutoff)
        );
        assert_eq!(board.host().heat_shutdowns, 0);

        board.feedback_mut().tone_playing = false;
        board.run_slices_for(Micros::from_millis(100));
        assert_eq!(board.host().heat_shutdowns, 1);
    }

    #[test]
    fn test_single_unplugged_extruder_is_silent() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.ex(1).disabled = false;
        board.ex(1).reading = Err(SensorError::OpenCircuit);

        board.run_slices_for(Micros::from_secs(2));

        assert!(board.monitor(HeaterChannel::ExtruderB).has_failed());
        assert_eq!(board.shutdown_state(), ShutdownState::Normal);
        assert!(!board.is_waiting_for_button());
        assert_eq!(
            count_ui(&board, UiEvent::Error(Message::HeaterFailNotPluggedIn)),
            0
        );
    }

    #[test]
    fn test_both_unplugged_raises_one_notice() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.ex(0).target = 220;
        board.ex(1).disabled = false;
        board.ex(1).target = 200;
        board.platform_mut().target = 100;
        board.ex(0).reading = Err(SensorError::OpenCircuit);
        board.ex(1).reading = Err(SensorError::OpenCircuit);

        board.run_slices_for(Micros::from_secs(2));

        assert_eq!(board.shutdown_state(), ShutdownState::Normal);
        assert!(board.is_waiting_for_button());
        assert_eq!(
            count_ui(&board, UiEvent::Error(Message::HeaterFailNotPluggedIn)),
            1
        );
        // Only the failed heaters are switched off
        assert_eq!(board.ex(0).target, 0);
        assert_eq!(board.ex(1).target, 0);
        assert_eq!(board.platform().target, 100);
        assert!(!board.motion().aborted);

        // Acknowledge, keep running: the notice is not repeated
        board.ui_mut().press_button();
        board.run_slices_for(Micros::from_secs(5));
        assert!(!board.is_waiting_for_button());
        assert_eq!(
            count_ui(&board, UiEvent::Error(Message::HeaterFailNotPluggedIn)),
            1
        );
    }

    #[test]
    fn test_onboard_process_keeps_heat() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.reset_heat_hold_timeout();
        board.ex(0).target = 220;
        board.set_board_status(BoardStatus::ONBOARD_PROCESS, true);

        // Default heat hold is one second
        board.run_slices_for(Micros::from_secs(3));

        assert_eq!(board.ex(0).target, 220);
        assert!(!board.is_waiting_for_button());
        assert!(!board
            .board_status()
            .contains(BoardStatus::HEAT_INACTIVE_SHUTDOWN));
    }

    #[test]
    fn test_user_input_timeout_shuts_heaters_down() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.ex(0).target = 220;
        board.platform_mut().target = 100;

        board.run_slices_for(USER_INPUT_TIMEOUT + Micros::from_secs(1));

        assert_eq!(board.ex(0).target, 0);
        assert_eq!(board.platform().target, 0);
        assert!(board.is_waiting_for_button());
        assert!(board
            .board_status()
            .contains(BoardStatus::HEAT_INACTIVE_SHUTDOWN));
        assert!(!board.board_status().contains(BoardStatus::PREHEATING));
        assert_eq!(count_ui(&board, UiEvent::Error(Message::HeaterInactivity)), 1);
        assert!(board
            .feedback()
            .events
            .contains(&FeedbackEvent::Color(Rgb::BLUE, true)));

        // No second notice while nothing restarts the timeout
        board.run_slices_for(Micros::from_minutes(5));
        assert_eq!(count_ui(&board, UiEvent::Error(Message::HeaterInactivity)), 1);
    }

    #[test]
    fn test_inactivity_without_targets_is_silent() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);

        board.run_slices_for(USER_INPUT_TIMEOUT + Micros::from_secs(1));

        assert!(!board.is_waiting_for_button());
        assert!(board
            .board_status()
            .contains(BoardStatus::HEAT_INACTIVE_SHUTDOWN));
    }

    #[test]
    fn test_quiet_cancel_within_grace() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);

        // Build cancelled with no hold time configured
        board.ex(0).target = 220;
        board.reset_heat_hold_timeout();
        board.run_slices_for(Micros::from_secs(2));

        assert_eq!(board.ex(0).target, 0);
        assert!(!board.is_waiting_for_button());
    }

    #[test]
    fn test_heat_hold_with_configured_minutes_warns() {
        let indicators = SharedIndicators::new();
        let mut board = mock_board(&indicators, |io| {
            io.config.set(ConfigKey::HeaterTimeoutOnCancel, 2);
        });
        board.init();
        board.reset(true);

        board.ex(0).target = 220;
        board.reset_heat_hold_timeout();

        board.run_slices_for(Micros::from_minutes(1));
        assert_eq!(board.ex(0).target, 220);

        board.run_slices_for(Micros::from_minutes(1) + Micros::from_secs(2));
        assert_eq!(board.ex(0).target, 0);
        assert!(board.is_waiting_for_button());
    }

    #[test]
    fn test_no_inactivity_while_building() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.host_mut().state = BuildState::BuildingFromStorage;
        board.ex(0).target = 220;

        board.run_slices_for(USER_INPUT_TIMEOUT + Micros::from_secs(1));
        assert_eq!(board.ex(0).target, 220);
        assert!(!board.is_waiting_for_button());
    }

    #[test]
    fn test_button_activity_restarts_user_timeout() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.ex(0).target = 220;

        for _ in 0..4 {
            board.run_slices_for(Micros::from_minutes(10));
            board.ui_mut().activity = true;
        }
        assert_eq!(board.ex(0).target, 220);
    }

    #[test]
    fn test_acknowledging_inactivity_restores_leds() {
        let indicators = SharedIndicators::new();
        let mut board = booted(&indicators);
        board.ex(0).target = 220;
        board.run_slices_for(USER_INPUT_TIMEOUT + Micros::from_secs(1));
        assert_eq!(indicators.interface_mode(), InterfaceMode::Blink { on: 25, off: 15 });

        board.ui_mut().press_button();
        board.run_slice();
        assert!(!board.is_waiting_for_button());
        assert_eq!(indicators.interface_mode(), InterfaceMode::Solid(true));
        assert_eq!(board.host().stop_requests, 0);
    }

    #[test]
    fn test_heating_alerts_follow_progress() {
        let indicators = SharedIndicators::new();
        let mut board = mock_board(&indicators, |io| {
            io.config.set(ConfigKey::LedStripSettings, 1);
        });
        board.init();
        board.reset(true);
        board.start_progress_bar(3, 0, 20);

        board.ex(0).target = 200;
        board.ex(0).delta = 50;
        board.ex(0).paused = true;
        board.run_slices_for(Micros::from_millis(200));

        // Platform idle: paused extruders resume
        assert!(!board.ex(0).paused);
        assert!(board
            .feedback()
            .events
            .iter()
            .any(|e| matches!(e, FeedbackEvent::Color(_, false))));
        assert!(board.ui().events.contains(&UiEvent::HeatProgress(15)));

        let defaults_before = count_feedback(&board, FeedbackEvent::DefaultColor);
        board.ex(0).target = 0;
        board.run_slices_for(Micros::from_millis(200));
        assert_eq!(
            count_feedback(&board, FeedbackEvent::DefaultColor),
            defaults_before + 1
        );
    }
}
