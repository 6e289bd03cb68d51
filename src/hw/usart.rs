// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART console.
//!
//! One USART carries both the `log` output and the shot reports. It lives in a global guarded by
//! a critical section so the logger can reach it from anywhere; [`ConsoleWriter`] is the
//! [`fmt::Write`] handle the reporters write through.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```

use core::cell::RefCell;
use core::fmt::{self, Write};

use cortex_m::interrupt::{self, Mutex};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use nb::block;
use stm32f7xx_hal::{
    pac::USART1,
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.bytes().for_each(|b| self.write_byte(b));
        Ok(())
    }
}

static CONSOLE: Mutex<RefCell<Option<Usart<USART1>>>> = Mutex::new(RefCell::new(None));
static LOGGER: ConsoleLogger = ConsoleLogger;

/// Run `f` on the console if it has been installed.
fn with_console<R>(f: impl FnOnce(&mut Usart<USART1>) -> R) -> Option<R> {
    interrupt::free(|cs| CONSOLE.borrow(cs).borrow_mut().as_mut().map(f))
}

/// Hand the USART to the console and route `log` output to it.
pub fn install(usart: Usart<USART1>, level: LevelFilter) -> Result<(), SetLoggerError> {
    interrupt::free(|cs| CONSOLE.borrow(cs).replace(Some(usart)));
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Writer over the shared console. Output before [`install`] is dropped.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConsoleWriter;

impl fmt::Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        with_console(|u| u.write_str(s)).unwrap_or(Ok(()))
    }
}

/// `log` backend printing `[LEVEL] message` lines on the console.
pub struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        with_console(|u| {
            let _ = write!(u, "[{}] {}\r\n", record.level(), record.args());
        });
    }

    fn flush(&self) {
        with_console(|u| u.flush());
    }
}
