//! Button panel interaction device
//!
//! Five active-low buttons and a detect line pulled low by an attached
//! panel. The LCD renderer is outside this firmware; screen changes are
//! logged instead.

use defmt::*;
use embassy_rp::gpio::Input;
use heapless::Vec;

use mightyboard_core::traits::{InitialScreen, InteractionDevice, Message, ProgressBar};
use mightyboard_core::Micros;

/// Screen redraw interval
const UPDATE_RATE: Micros = Micros::from_millis(500);

const SCREEN_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
enum Screen {
    Initial(InitialScreen),
    Message(Message),
}

/// Panel buttons in mask bit order
pub struct Buttons {
    pub up: Input<'static>,
    pub down: Input<'static>,
    pub left: Input<'static>,
    pub right: Input<'static>,
    pub center: Input<'static>,
}

impl Buttons {
    fn scan(&self) -> u8 {
        [&self.up, &self.down, &self.left, &self.right, &self.center]
            .iter()
            .enumerate()
            .fold(0, |mask, (bit, pin)| {
                if pin.is_low() {
                    mask | (1 << bit)
                } else {
                    mask
                }
            })
    }
}

pub struct ButtonPanel {
    buttons: Buttons,
    detect: Input<'static>,
    screens: Vec<Screen, SCREEN_DEPTH>,
    /// Buttons held at the previous scan
    held: u8,
    /// Presses not yet consumed
    pressed: u8,
    awaited: Option<u8>,
    activity: bool,
    dirty: bool,
}

impl ButtonPanel {
    pub fn new(buttons: Buttons, detect: Input<'static>) -> Self {
        Self {
            buttons,
            detect,
            screens: Vec::new(),
            held: 0,
            pressed: 0,
            awaited: None,
            activity: false,
            dirty: false,
        }
    }

    fn push_screen(&mut self, screen: Screen) {
        if self.screens.is_full() {
            self.screens.remove(0);
        }
        let _ = self.screens.push(screen);
        self.dirty = true;
    }
}

impl InteractionDevice for ButtonPanel {
    fn is_connected(&self) -> bool {
        self.detect.is_low()
    }

    fn init(&mut self) {
        self.screens.clear();
        self.held = self.buttons.scan();
        self.pressed = 0;
        self.awaited = None;
        self.activity = false;
    }

    fn queue_initial_screen(&mut self, screen: InitialScreen) {
        self.push_screen(Screen::Initial(screen));
    }

    fn pop_screen(&mut self) {
        self.screens.pop();
        self.dirty = true;
    }

    fn error_message(&mut self, message: Message) {
        warn!("{}", message.text());
        self.push_screen(Screen::Message(message));
    }

    fn wait_for_button(&mut self, mask: u8) {
        self.awaited = Some(mask);
        self.pressed = 0;
    }

    fn button_pushed(&mut self) -> bool {
        let Some(mask) = self.awaited else {
            return false;
        };
        if self.pressed & mask == 0 {
            return false;
        }
        self.pressed = 0;
        self.awaited = None;
        true
    }

    fn done_with_message(&mut self, pop_screen: bool) {
        if let Some(Screen::Message(_)) = self.screens.last() {
            self.screens.pop();
        }
        if pop_screen {
            self.screens.pop();
        }
        self.dirty = true;
    }

    fn do_update(&mut self) {
        if core::mem::take(&mut self.dirty) {
            debug!("Screen: {}", self.screens.last());
        }
    }

    fn do_interrupt(&mut self) {
        let held = self.buttons.scan();
        let new_presses = held & !self.held;
        self.held = held;
        if new_presses != 0 {
            self.pressed |= new_presses;
            self.activity = true;
        }
    }

    fn user_activity(&mut self) -> bool {
        core::mem::take(&mut self.activity)
    }

    fn update_rate(&self) -> Micros {
        UPDATE_RATE
    }

    fn show_heat_progress(&mut self, bar: ProgressBar, filled: u8) {
        debug!("Heating {}/{} on line {}", filled, bar.width(), bar.line);
    }

    fn clear_heat_progress(&mut self, bar: ProgressBar) {
        debug!("Heating bar cleared on line {}", bar.line);
    }
}
