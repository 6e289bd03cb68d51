// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 target controller.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiod, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust,ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub capture: CapturePins,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// Sensor comparator outputs into TIM2 CH1..CH4.
pub struct CapturePins {
    pub north: gpioa::PA0<Alternate<1>>,
    pub east: gpioa::PA1<Alternate<1>>,
    pub south: gpioa::PA2<Alternate<1>>,
    pub west: gpioa::PA3<Alternate<1>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiod = gpiod.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            capture: CapturePins {
                north: gpioa.pa0.into_alternate::<1>(),
                east: gpioa.pa1.into_alternate::<1>(),
                south: gpioa.pa2.into_alternate::<1>(),
                west: gpioa.pa3.into_alternate::<1>(),
            },
        }
    }
}
