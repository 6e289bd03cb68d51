// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use log::{info, warn, LevelFilter};
use stm32f7xx_hal as hal;

use freetarget::hw::{usart, BoardPins, ConsoleWriter, ShotCapture, StatusLeds, Usart};
use freetarget::report::{JsonReporter, Reporter};
use freetarget::{Target, TargetConfig};

/// 16 MHz HSI timer clock down to the 8 MHz capture tick.
const CAPTURE_PRESCALER: u16 = 1;

/// Ticks after the first arrival before a shot is closed with missing channels (1 ms).
const CAPTURE_WINDOW: u32 = 8_000;

/// Skip the noise gate for bench captures.
const TEST_MODE: bool = false;

#[entry]
fn main() -> ! {
    // Peripherals
    let Some(dp) = pac::Peripherals::take() else {
        panic!("peripherals already taken");
    };

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD);
    let mut leds = StatusLeds::new(pins.leds);

    // USART1 (DBG)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks, usart_cfg);
    if let Err(e) = usart::install(Usart::new(serial), LevelFilter::Info) {
        // No log output this run: flag it on the board and straight on the console.
        leds.red.on();
        let _ = writeln!(ConsoleWriter, "logger not installed: {}", e);
    }

    let mut capture = ShotCapture::tim2(dp.TIM2, CAPTURE_PRESCALER);
    let mut target = Target::new(TargetConfig::default());
    let mut reporter = JsonReporter::new(ConsoleWriter);

    info!("freETarget armed");
    leds.armed();

    loop {
        let Some(shot) = capture.poll(CAPTURE_WINDOW) else {
            continue;
        };
        leds.busy();

        if log::log_enabled!(log::Level::Debug) {
            let _ = reporter.send_timer(&shot);
        }
        match target.process_and_report(&shot, TEST_MODE, &mut reporter) {
            Ok(outcome) => leds.result(outcome.is_hit()),
            Err(_) => warn!("report for shot {} not sent", target.shots()),
        }

        capture.arm();
        leds.armed();
    }
}
