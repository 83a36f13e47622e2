//! MightyBoard - 3D printer mainboard firmware
//!
//! Main firmware binary for RP2040-based printer mainboards. The control
//! slice runs on the thread executor; the clock tick and the stepper
//! alarm run on a higher-priority interrupt executor and preempt it.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use {defmt_rtt as _, panic_probe as _};

use mightyboard_core::traits::Rgb;
use mightyboard_core::BoardParts;
use mightyboard_drivers::heater::{BangBangConfig, BangBangHeater, GpioHeater};
use mightyboard_drivers::sensor::Ntc100kSensor;

use crate::config::FlashSettings;
use crate::devices::ui::Buttons;
use crate::devices::{AdcChannel, AxisMotion, ButtonPanel, PwmFeedback, RpHeater, SharedMotion};
use crate::io::FirmwareBoard;
use crate::shared::{ADC, CLOCK, HOST, INDICATORS};

mod config;
mod devices;
mod io;
mod shared;
mod tasks;

/// Thermistor divider pull-up
const THERMISTOR_PULLUP_OHMS: u32 = 4_700;

/// LED strip colour outside of alerts
const DEFAULT_COLOR: Rgb = Rgb::new(255, 255, 255);

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MightyBoard firmware starting...");

    let p = embassy_rp::init(Default::default());

    let settings = FlashSettings::load(p.FLASH);

    // Thermistors: TH0 = GPIO26, TH1 = GPIO27, bed = GPIO28
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    ADC.lock(|cell| *cell.borrow_mut() = Some(adc));

    let heater = |channel: Channel<'static>, output: Output<'static>, config: BangBangConfig| -> RpHeater {
        BangBangHeater::new(
            Ntc100kSensor::new(AdcChannel::new(channel), THERMISTOR_PULLUP_OHMS),
            GpioHeater::new_active_high(output),
            config,
        )
    };
    let extruders = [
        heater(
            Channel::new_pin(p.PIN_26, Pull::None),
            Output::new(p.PIN_23, Level::Low),
            BangBangConfig::EXTRUDER,
        ),
        heater(
            Channel::new_pin(p.PIN_27, Pull::None),
            Output::new(p.PIN_21, Level::Low),
            BangBangConfig::EXTRUDER,
        ),
    ];
    let platform = heater(
        Channel::new_pin(p.PIN_28, Pull::None),
        Output::new(p.PIN_24, Level::Low),
        BangBangConfig::PLATFORM,
    );
    info!("Heaters initialized");

    // Stepper driver enables: X, Y, Z, A, B
    SharedMotion::install(AxisMotion::new([
        Output::new(p.PIN_12, Level::High),
        Output::new(p.PIN_13, Level::High),
        Output::new(p.PIN_14, Level::High),
        Output::new(p.PIN_16, Level::High),
        Output::new(p.PIN_17, Level::High),
    ]));

    let ui = ButtonPanel::new(
        Buttons {
            up: Input::new(p.PIN_2, Pull::Up),
            down: Input::new(p.PIN_3, Pull::Up),
            left: Input::new(p.PIN_4, Pull::Up),
            right: Input::new(p.PIN_5, Pull::Up),
            center: Input::new(p.PIN_6, Pull::Up),
        },
        Input::new(p.PIN_8, Pull::Up),
    );

    let feedback = PwmFeedback::new(
        Pwm::new_output_a(p.PWM_SLICE3, p.PIN_22, PwmConfig::default()),
        Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_18, p.PIN_19, PwmConfig::default()),
        Pwm::new_output_a(p.PWM_SLICE2, p.PIN_20, PwmConfig::default()),
        DEFAULT_COLOR,
    );
    info!("Interface and feedback initialized");

    let board = FirmwareBoard::new(BoardParts {
        clock: &CLOCK,
        indicators: &INDICATORS,
        extruders,
        platform,
        ui,
        motion: SharedMotion,
        host: &HOST,
        feedback,
        config: settings,
    });

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high.spawn(tasks::tick_task(
        Output::new(p.PIN_25, Level::Low),
        Output::new(p.PIN_15, Level::Low),
    ))
    .unwrap();
    high.spawn(tasks::stepper_task()).unwrap();

    spawner.spawn(tasks::slice_task(board)).unwrap();

    info!("All tasks spawned, firmware running");
}
