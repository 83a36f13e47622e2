//! Indicator LEDs
//!
//! The debug LED blinks an error code, the interface LEDs blink while the
//! board waits for the user. Both are stepped from the tick interrupt and
//! configured from the main loop, so their state lives behind a
//! critical-section mutex. The caller in tick context applies the returned
//! pin levels.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::timing::INDICATOR_PRESCALE;

/// Indicator steps the debug LED stays on per blink
const DEBUG_ON_STEPS: u8 = 18;
/// Indicator steps the debug LED stays off between blinks
const DEBUG_OFF_STEPS: u8 = 18;
/// Indicator steps between two repetitions of the code
const DEBUG_PAUSE_STEPS: u8 = 80;

/// Pin levels to apply, `None` = leave unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorLevels {
    pub debug: Option<bool>,
    pub interface: Option<bool>,
}

impl IndicatorLevels {
    fn merge(self, newer: IndicatorLevels) -> IndicatorLevels {
        IndicatorLevels {
            debug: newer.debug.or(self.debug),
            interface: newer.interface.or(self.interface),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum DebugPhase {
    Idle,
    On,
    Off,
    Pause,
}

/// Blinks an error code on the debug LED
#[derive(Debug, Clone)]
struct ErrorBlinker {
    phase: DebugPhase,
    code: u8,
    blinked: u8,
    remaining: u8,
}

impl ErrorBlinker {
    const fn new() -> Self {
        Self {
            phase: DebugPhase::Idle,
            code: 0,
            blinked: 0,
            remaining: 0,
        }
    }

    fn indicate(&mut self, code: u8) -> Option<bool> {
        let level = if code == 0 {
            self.phase = DebugPhase::Idle;
            Some(false)
        } else {
            if self.code != code {
                self.phase = DebugPhase::Off;
            }
            None
        };
        self.code = code;
        level
    }

    fn step(&mut self) -> Option<bool> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return None;
        }
        match self.phase {
            DebugPhase::Idle => None,
            DebugPhase::On => {
                self.blinked = self.blinked.saturating_add(1);
                self.phase = DebugPhase::Off;
                self.remaining = DEBUG_OFF_STEPS;
                Some(false)
            }
            DebugPhase::Off => {
                if self.blinked >= self.code {
                    self.phase = DebugPhase::Pause;
                    self.remaining = DEBUG_PAUSE_STEPS;
                    None
                } else {
                    self.phase = DebugPhase::On;
                    self.remaining = DEBUG_ON_STEPS;
                    Some(true)
                }
            }
            DebugPhase::Pause => {
                self.blinked = 0;
                self.phase = DebugPhase::On;
                self.remaining = DEBUG_ON_STEPS;
                Some(true)
            }
        }
    }
}

/// How the interface LEDs are driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceMode {
    /// Constant level
    Solid(bool),
    /// Blinking with on/off durations in indicator steps
    Blink { on: u8, off: u8 },
}

#[derive(Debug, Clone)]
struct InterfaceBlinker {
    mode: InterfaceMode,
    /// Next step turns the LEDs on
    lit_next: bool,
    remaining: u8,
}

impl InterfaceBlinker {
    const fn new() -> Self {
        Self {
            mode: InterfaceMode::Solid(true),
            lit_next: true,
            remaining: 0,
        }
    }

    fn configure(&mut self, on: u8, off: u8) -> Option<bool> {
        if off == 0 {
            self.mode = InterfaceMode::Solid(true);
            Some(true)
        } else if on == 0 {
            self.mode = InterfaceMode::Solid(false);
            Some(false)
        } else {
            self.mode = InterfaceMode::Blink { on, off };
            self.lit_next = true;
            None
        }
    }

    fn step(&mut self) -> Option<bool> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return None;
        }
        match self.mode {
            InterfaceMode::Solid(_) => None,
            InterfaceMode::Blink { on, off } => {
                let lit = self.lit_next;
                self.remaining = if lit { on } else { off };
                self.lit_next = !lit;
                Some(lit)
            }
        }
    }
}

/// Indicator LED state machine
#[derive(Debug, Clone)]
pub struct Indicators {
    debug: ErrorBlinker,
    interface: InterfaceBlinker,
    prescaler: u8,
    /// Levels requested from the main loop, applied on the next tick
    pending: IndicatorLevels,
}

impl Default for Indicators {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicators {
    pub const fn new() -> Self {
        Self {
            debug: ErrorBlinker::new(),
            interface: InterfaceBlinker::new(),
            prescaler: 0,
            pending: IndicatorLevels {
                debug: None,
                interface: None,
            },
        }
    }

    /// Blink `code` on the debug LED; 0 turns it off
    pub fn indicate_error(&mut self, code: u8) {
        let level = self.debug.indicate(code);
        self.pending = self.pending.merge(IndicatorLevels {
            debug: level,
            interface: None,
        });
    }

    /// Configure the interface LEDs
    ///
    /// Both times zero: solid on. Only `on` zero: solid off.
    pub fn interface_blink(&mut self, on: u8, off: u8) {
        let level = self.interface.configure(on, off);
        self.pending = self.pending.merge(IndicatorLevels {
            debug: None,
            interface: level,
        });
    }

    pub fn current_error(&self) -> u8 {
        self.debug.code
    }

    pub fn interface_mode(&self) -> InterfaceMode {
        self.interface.mode
    }

    /// Advance by one clock tick, returning pin changes to apply
    pub fn on_tick(&mut self) -> IndicatorLevels {
        let pending = core::mem::take(&mut self.pending);

        let count = self.prescaler;
        self.prescaler = count.wrapping_add(1);
        if count < INDICATOR_PRESCALE {
            return pending;
        }
        self.prescaler = 0;

        pending.merge(IndicatorLevels {
            debug: self.debug.step(),
            interface: self.interface.step(),
        })
    }
}

/// Indicators shared between the tick interrupt and the main loop
pub struct SharedIndicators {
    inner: Mutex<RefCell<Indicators>>,
}

impl Default for SharedIndicators {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIndicators {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Indicators::new())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Indicators) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    pub fn indicate_error(&self, code: u8) {
        self.with(|ind| ind.indicate_error(code))
    }

    pub fn interface_blink(&self, on: u8, off: u8) {
        self.with(|ind| ind.interface_blink(on, off))
    }

    pub fn current_error(&self) -> u8 {
        self.with(|ind| ind.current_error())
    }

    pub fn interface_mode(&self) -> InterfaceMode {
        self.with(|ind| ind.interface_mode())
    }

    /// Tick-context entry point
    pub fn on_tick(&self) -> IndicatorLevels {
        self.with(|ind| ind.on_tick())
    }
}
