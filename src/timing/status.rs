// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Sensor validity set.
//!
//! The capture hardware reports one bit per channel: set when that sensor latched an arrival
//! this shot. Bit `n` is [`Sensor`] channel `n`.

use crate::geometry::Sensor;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SensorStatus(u8);

impl SensorStatus {
    pub const NONE: SensorStatus = SensorStatus(0);
    pub const ALL: SensorStatus = SensorStatus(0x0F);

    /// Build from a raw register value. Bits above the four channels are dropped.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_valid(self, sensor: Sensor) -> bool {
        self.0 & (1 << sensor.index()) != 0
    }

    #[must_use]
    pub fn with(self, sensor: Sensor) -> Self {
        Self(self.0 | (1 << sensor.index()))
    }

    #[must_use]
    pub fn without(self, sensor: Sensor) -> Self {
        Self(self.0 & !(1 << sensor.index()))
    }

    /// Number of usable sensors.
    #[inline]
    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Valid sensors in channel order.
    pub fn iter(self) -> impl Iterator<Item = Sensor> {
        Sensor::ALL.into_iter().filter(move |&s| self.is_valid(s))
    }
}

impl FromIterator<Sensor> for SensorStatus {
    fn from_iter<I: IntoIterator<Item = Sensor>>(iter: I) -> Self {
        iter.into_iter().fold(SensorStatus::NONE, SensorStatus::with)
    }
}
