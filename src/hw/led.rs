// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LEDs.

use embedded_hal::digital::v2::OutputPin;
use stm32f7xx_hal::gpio::{gpiod, Output, PushPull};

use crate::hw::pins::LedPins;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// One LED that remembers its active level and last state.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.off();
        led
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        let high = on == (self.active == ActiveLevel::High);
        let _ = if high { self.pin.set_high() } else { self.pin.set_low() };
        self.is_on = on;
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }
}

/// Red, yellow and green indicators on PD8..PD10.
///
/// Green: armed and waiting. Yellow: solving. Red: last shot was a miss.
pub struct StatusLeds {
    pub red: Led<gpiod::PD8<Output<PushPull>>>,
    pub yellow: Led<gpiod::PD9<Output<PushPull>>>,
    pub green: Led<gpiod::PD10<Output<PushPull>>>,
}

impl StatusLeds {
    pub fn new(pins: LedPins) -> Self {
        Self {
            red: Led::active_low(pins.red),
            yellow: Led::active_low(pins.yellow),
            green: Led::active_low(pins.green),
        }
    }

    pub fn armed(&mut self) {
        self.yellow.off();
        self.green.on();
    }

    pub fn busy(&mut self) {
        self.green.off();
        self.yellow.on();
    }

    pub fn result(&mut self, hit: bool) {
        self.red.set(!hit);
    }
}
