//! Clock tick task
//!
//! Advances the board clock by one tick period and steps the indicator
//! LEDs. Missed ticks are delivered late by the ticker, so the clock never
//! loses time.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker};

use mightyboard_core::config::timing::MICROS_PER_TICK;

use crate::shared::{CLOCK, INDICATORS};

#[embassy_executor::task]
pub async fn tick_task(mut debug_led: Output<'static>, mut interface_led: Output<'static>) {
    info!("Tick task started ({} us period)", MICROS_PER_TICK);

    let mut ticker = Ticker::every(Duration::from_micros(MICROS_PER_TICK));
    loop {
        ticker.next().await;
        CLOCK.advance();

        let levels = INDICATORS.on_tick();
        if let Some(on) = levels.debug {
            debug_led.set_level(on.into());
        }
        if let Some(on) = levels.interface {
            interface_led.set_level(on.into());
        }
    }
}
