//! Recording mock collaborators for host tests

use crate::board::{Board, BoardIo, BoardParts};
use crate::clock::{Micros, TickClock};
use crate::config::{ConfigKey, ConfigStore};
use crate::indicator::SharedIndicators;
use crate::traits::{
    BuildState, Feedback, Heater, HostLink, InitialScreen, InteractionDevice, Message, Motion,
    ProgressBar, Rgb, SensorError, StepTimer, Tone, STEPPER_COUNT,
};

/// Clock step between two simulated slices
pub const SLICE: Micros = Micros::from_millis(10);

/// Mock clocks start one minute before the counter wraps
const CLOCK_START: Micros = Micros(u64::MAX - 60_000_000);

const EVENT_CAPACITY: usize = 128;

/// Byte store; unset keys read as the caller's default
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    bytes: [Option<u8>; ConfigKey::ALL.len()],
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: ConfigKey, value: u8) {
        if let Some(slot) = ConfigKey::ALL.iter().position(|k| *k == key) {
            self.bytes[slot] = Some(value);
        }
    }
}

impl ConfigStore for MockConfig {
    fn read_byte(&self, key: ConfigKey, default: u8) -> u8 {
        ConfigKey::ALL
            .iter()
            .position(|k| *k == key)
            .and_then(|slot| self.bytes[slot])
            .unwrap_or(default)
    }
}

/// Heater whose reading creeps towards the target on every management step
#[derive(Debug, Clone)]
pub struct MockHeater {
    pub target: i16,
    pub reading: Result<i16, SensorError>,
    pub delta: i16,
    pub failed: bool,
    pub paused: bool,
    pub disabled: bool,
    /// Management steps leave the reading unchanged
    pub stalled: bool,
    pub manage_calls: u32,
}

impl MockHeater {
    pub fn at(temp_c: i16) -> Self {
        Self {
            target: 0,
            reading: Ok(temp_c),
            delta: 0,
            failed: false,
            paused: false,
            disabled: false,
            stalled: false,
            manage_calls: 0,
        }
    }
}

impl Heater for MockHeater {
    fn target_temperature(&self) -> i16 {
        self.target
    }

    fn set_target_temperature(&mut self, target_c: i16) {
        self.target = target_c;
    }

    fn current_temperature(&self) -> Result<i16, SensorError> {
        self.reading
    }

    fn delta(&self) -> i16 {
        self.delta
    }

    fn is_heating(&self) -> bool {
        self.target > 0 && !self.disabled
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn has_failed(&self) -> bool {
        self.failed
    }

    fn disable(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn reset(&mut self) {
        self.target = 0;
        self.failed = false;
        self.paused = false;
    }

    fn manage_temperature(&mut self) {
        self.manage_calls += 1;
        if self.stalled {
            return;
        }
        if let Ok(temp_c) = self.reading {
            if temp_c < self.target {
                self.reading = Ok(temp_c + 1);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Init,
    QueueScreen(InitialScreen),
    PopScreen,
    Error(Message),
    WaitForButton(u8),
    DoneWithMessage(bool),
    HeatProgress(u8),
    ClearHeatProgress,
}

/// Interaction device recording everything except the periodic calls
#[derive(Debug, Clone)]
pub struct MockUi {
    pub connected: bool,
    pub rate: Micros,
    pub events: heapless::Vec<UiEvent, EVENT_CAPACITY>,
    pub updates: u32,
    pub pushed: bool,
    pub activity: bool,
}

impl Default for MockUi {
    fn default() -> Self {
        Self {
            connected: true,
            rate: Micros::from_millis(100),
            events: heapless::Vec::new(),
            updates: 0,
            pushed: false,
            activity: false,
        }
    }
}

impl MockUi {
    pub fn press_button(&mut self) {
        self.pushed = true;
        self.activity = true;
    }

    fn record(&mut self, event: UiEvent) {
        assert!(self.events.push(event).is_ok(), "ui event log full");
    }
}

impl InteractionDevice for MockUi {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn init(&mut self) {
        self.record(UiEvent::Init);
    }

    fn queue_initial_screen(&mut self, screen: InitialScreen) {
        self.record(UiEvent::QueueScreen(screen));
    }

    fn pop_screen(&mut self) {
        self.record(UiEvent::PopScreen);
    }

    fn error_message(&mut self, message: Message) {
        self.record(UiEvent::Error(message));
    }

    fn wait_for_button(&mut self, mask: u8) {
        self.record(UiEvent::WaitForButton(mask));
    }

    fn button_pushed(&mut self) -> bool {
        core::mem::take(&mut self.pushed)
    }

    fn done_with_message(&mut self, pop_screen: bool) {
        self.record(UiEvent::DoneWithMessage(pop_screen));
    }

    fn do_update(&mut self) {
        self.updates += 1;
    }

    fn do_interrupt(&mut self) {}

    fn user_activity(&mut self) -> bool {
        core::mem::take(&mut self.activity)
    }

    fn update_rate(&self) -> Micros {
        self.rate
    }

    fn show_heat_progress(&mut self, _bar: ProgressBar, filled: u8) {
        self.record(UiEvent::HeatProgress(filled));
    }

    fn clear_heat_progress(&mut self, _bar: ProgressBar) {
        self.record(UiEvent::ClearHeatProgress);
    }
}

#[derive(Debug, Clone)]
pub struct MockMotion {
    pub hold_z: Option<bool>,
    pub aborted: bool,
    pub enabled: [bool; STEPPER_COUNT],
    pub steps: u32,
}

impl Default for MockMotion {
    fn default() -> Self {
        Self {
            hold_z: None,
            aborted: false,
            enabled: [true; STEPPER_COUNT],
            steps: 0,
        }
    }
}

impl Motion for MockMotion {
    fn abort(&mut self) {
        self.aborted = true;
    }

    fn enable_axis(&mut self, axis: usize, enabled: bool) {
        if let Some(slot) = self.enabled.get_mut(axis) {
            *slot = enabled;
        }
    }

    fn set_hold_z(&mut self, hold: bool) {
        self.hold_z = Some(hold);
    }

    fn advance_step(&mut self) {
        self.steps += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockHost {
    pub state: BuildState,
    pub paused: bool,
    pub stop_requests: u32,
    pub heat_shutdowns: u32,
}

impl HostLink for MockHost {
    fn build_state(&self) -> BuildState {
        self.state
    }

    fn stop_build(&mut self) {
        self.stop_requests += 1;
    }

    fn notify_heat_shutdown(&mut self) {
        self.heat_shutdowns += 1;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    Tone(Tone),
    ErrorPattern,
    DefaultColor,
    Color(Rgb, bool),
}

#[derive(Debug, Clone, Default)]
pub struct MockFeedback {
    pub events: heapless::Vec<FeedbackEvent, EVENT_CAPACITY>,
    pub tone_playing: bool,
}

impl MockFeedback {
    fn record(&mut self, event: FeedbackEvent) {
        assert!(self.events.push(event).is_ok(), "feedback event log full");
    }
}

impl Feedback for MockFeedback {
    fn play_tone(&mut self, tone: Tone) {
        self.record(FeedbackEvent::Tone(tone));
    }

    fn is_tone_playing(&self) -> bool {
        self.tone_playing
    }

    fn set_error_pattern(&mut self) {
        self.record(FeedbackEvent::ErrorPattern);
    }

    fn set_default_color(&mut self) {
        self.record(FeedbackEvent::DefaultColor);
    }

    fn set_color(&mut self, color: Rgb, blocking: bool) {
        self.record(FeedbackEvent::Color(color, blocking));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Mask,
    Unmask,
    AllowNesting,
    ForbidNesting,
    FireSoon,
}

#[derive(Debug, Clone, Default)]
pub struct MockStepTimer {
    pub events: heapless::Vec<TimerEvent, 8>,
    pub overran: bool,
}

impl MockStepTimer {
    fn record(&mut self, event: TimerEvent) {
        assert!(self.events.push(event).is_ok(), "timer event log full");
    }
}

impl StepTimer for MockStepTimer {
    fn mask(&mut self) {
        self.record(TimerEvent::Mask);
    }

    fn unmask(&mut self) {
        self.record(TimerEvent::Unmask);
    }

    fn allow_nesting(&mut self) {
        self.record(TimerEvent::AllowNesting);
    }

    fn forbid_nesting(&mut self) {
        self.record(TimerEvent::ForbidNesting);
    }

    fn overran(&self) -> bool {
        self.overran
    }

    fn fire_soon(&mut self) {
        self.record(TimerEvent::FireSoon);
    }
}

pub struct MockIo;

impl BoardIo for MockIo {
    type Clock = TickClock;
    type Extruder = MockHeater;
    type Platform = MockHeater;
    type Ui = MockUi;
    type Motion = MockMotion;
    type Host = MockHost;
    type Feedback = MockFeedback;
    type Config = MockConfig;
}

pub type MockBoard<'a> = Board<'a, MockIo>;

/// Build a board from default mocks, adjusted by `configure`
pub fn mock_board<'a>(
    indicators: &'a SharedIndicators,
    configure: impl FnOnce(&mut BoardParts<'a, MockIo>),
) -> MockBoard<'a> {
    let mut parts = BoardParts {
        clock: TickClock::starting_at(CLOCK_START),
        indicators,
        extruders: [MockHeater::at(25), MockHeater::at(25)],
        platform: MockHeater::at(25),
        ui: MockUi::default(),
        motion: MockMotion::default(),
        host: MockHost::default(),
        feedback: MockFeedback::default(),
        config: MockConfig::new(),
    };
    configure(&mut parts);
    Board::new(parts)
}

impl<'a> Board<'a, MockIo> {
    pub fn ex(&mut self, index: usize) -> &mut MockHeater {
        self.extruder_mut(index).expect("no such extruder")
    }

    /// Run slices `SLICE` apart until `duration` has passed
    pub fn run_slices_for(&mut self, duration: Micros) {
        let mut elapsed = Micros::ZERO;
        while elapsed < duration {
            self.clock().advance_by(SLICE);
            self.run_slice();
            elapsed = elapsed + SLICE;
        }
    }
}
