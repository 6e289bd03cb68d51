// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Arrival stamps held between the first and the last sensor of a shot.
//!
//! Reading a capture register usually clears its channel flag, so a stamp can be read only
//! once. The latch keeps every stamp from that read until the shot closes, either when all
//! sensors have fired or when the window since the earliest arrival runs out.

use crate::geometry::{Sensor, SENSOR_COUNT};
use crate::timing::{Capture, SensorStatus};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ArrivalLatch {
    seen: SensorStatus,
    stamps: [u32; SENSOR_COUNT],
}

impl ArrivalLatch {
    pub const fn new() -> Self {
        Self {
            seen: SensorStatus::NONE,
            stamps: [0; SENSOR_COUNT],
        }
    }

    /// Sensors stamped since the latch was last cleared.
    #[inline]
    pub fn seen(&self) -> SensorStatus {
        self.seen
    }

    /// Keep `sensor`'s stamp. The first stamp per shot wins.
    pub fn record(&mut self, sensor: Sensor, stamp: u32) {
        if !self.seen.is_valid(sensor) {
            self.stamps[sensor.index()] = stamp;
            self.seen = self.seen.with(sensor);
        }
    }

    /// Ticks from the earliest stamp to `now`, with counter wrap-around.
    pub fn age(&self, now: u32) -> Option<u32> {
        self.seen.iter().map(|s| now.wrapping_sub(self.stamps[s.index()])).max()
    }

    /// Hand out the shot once every sensor has fired or `window` ticks have passed since the
    /// earliest one. Timers are relative to the earliest stamp. The latch is empty afterwards.
    pub fn close(&mut self, now: u32, window: u32) -> Option<Capture> {
        let age = self.age(now)?;
        if self.seen != SensorStatus::ALL && age < window {
            return None;
        }

        let first = now.wrapping_sub(age);
        let mut timers = [0u32; SENSOR_COUNT];
        for s in self.seen.iter() {
            timers[s.index()] = self.stamps[s.index()].wrapping_sub(first);
        }
        let capture = Capture::new(self.seen, timers);
        self.clear();
        Some(capture)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
