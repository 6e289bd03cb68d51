// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Shock-wave arrival capture on TIM2.
//!
//! TIM2 free-runs over its full 32-bit range and latches CH1..CH4 (North, East, South, West) on
//! the rising edge of each sensor comparator. A shot is complete once every channel has fired
//! or the window since the first arrival has passed; the snapshot is then handed out relative to
//! the earliest arrival.
//!
//! Reading CCRx clears CCxIF, so each channel's stamp is read exactly once, when its flag is
//! first seen, and held in an [`ArrivalLatch`] until the shot closes.

use stm32f7xx_hal::pac;

use crate::geometry::Sensor;
use crate::timing::{ArrivalLatch, Capture, SensorStatus};

/// CCxIF flags sit in SR bits 1..=4.
const SR_CC_SHIFT: u32 = 1;

pub struct ShotCapture {
    tim: pac::TIM2,
    latch: ArrivalLatch,
}

impl ShotCapture {
    /// Configure TIM2 for four-channel input capture. `prescaler` divides the timer clock down
    /// to the capture tick.
    pub fn tim2(tim2: pac::TIM2, prescaler: u16) -> Self {
        // SAFETY: single read-modify-write of our own enable bit during start-up.
        unsafe { (*pac::RCC::ptr()).apb1enr.modify(|_, w| w.tim2en().set_bit()) };

        let tim = tim2;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.psc.write(|w| unsafe { w.psc().bits(prescaler) });
        tim.arr.write(|w| w.bits(0xFFFF_FFFF));

        // CH1..CH4 capture from their own inputs, no filter.
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());
        tim.ccmr2_input().modify(|_, w| w.cc3s().ti3().cc4s().ti4());

        // Rising edge, capture enabled.
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc3p()
                .clear_bit()
                .cc4p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
                .cc3e()
                .set_bit()
                .cc4e()
                .set_bit()
        });

        // Load the prescaler, then run.
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        let mut capture = Self {
            tim,
            latch: ArrivalLatch::new(),
        };
        capture.arm();
        capture
    }

    /// Clear every latched channel and wait for the next shot.
    pub fn arm(&mut self) {
        // SAFETY: SR flags are write-zero-to-clear.
        self.tim.sr.write(|w| unsafe { w.bits(0) });
        self.latch.clear();
    }

    #[inline]
    pub fn now(&self) -> u32 {
        self.tim.cnt.read().bits()
    }

    /// Channels whose flag is set and whose stamp has not been read yet.
    pub fn latched(&self) -> SensorStatus {
        SensorStatus::from_bits((self.tim.sr.read().bits() >> SR_CC_SHIFT) as u8)
    }

    fn ccr(&self, sensor: Sensor) -> u32 {
        match sensor {
            Sensor::North => self.tim.ccr1.read().bits(),
            Sensor::East => self.tim.ccr2.read().bits(),
            Sensor::South => self.tim.ccr3.read().bits(),
            Sensor::West => self.tim.ccr4.read().bits(),
        }
    }

    /// Snapshot of a finished shot, or `None` while nothing fired or the window is still open.
    ///
    /// `window` is in capture ticks from the first arrival.
    pub fn poll(&mut self, window: u32) -> Option<Capture> {
        let seen = self.latch.seen();
        for s in self.latched().iter().filter(|&s| !seen.is_valid(s)) {
            let stamp = self.ccr(s);
            self.latch.record(s, stamp);
        }
        self.latch.close(self.now(), window)
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM2 {
        self.tim
    }
}
