// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Sensor identities and the calibrated mounting geometry.
//!
//! The four sensors sit on a circle around the face, one per compass point, numbered clockwise
//! starting at North. Positions are stored in timer counts so a range and a timer value can be
//! compared directly.

use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::config::TargetConfig;
use crate::geometry::Point;

pub const SENSOR_COUNT: usize = 4;

/// One of the four microphones. The discriminant is the hardware channel number.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Sensor {
    #[default]
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Sensor {
    /// All sensors in channel order (clockwise from North).
    pub const ALL: [Sensor; SENSOR_COUNT] = [Sensor::North, Sensor::East, Sensor::South, Sensor::West];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Sensor for an index, wrapping modulo four.
    #[inline]
    pub fn from_index(i: usize) -> Sensor {
        Self::ALL[i % SENSOR_COUNT]
    }

    /// Next sensor going clockwise around the face.
    #[inline]
    pub fn clockwise(self) -> Sensor {
        Self::from_index(self.index() + 1)
    }

    /// Sensor across the face.
    #[inline]
    pub fn opposite(self) -> Sensor {
        Self::from_index(self.index() + 2)
    }

    pub fn label(self) -> &'static str {
        match self {
            Sensor::North => "N",
            Sensor::East => "E",
            Sensor::South => "S",
            Sensor::West => "W",
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calibrated mounting of one sensor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SensorCalibration {
    pub sensor: Sensor,
    /// Position in counts.
    pub position: Point,
    /// Heading of the edge towards the clockwise neighbour, radians. For the nominal square
    /// layout this is 45° off the axes.
    pub diagonal: f64,
    /// Length of that edge, counts.
    pub spacing: f64,
}

/// The calibration table. Built once at start-up, read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorGeometry {
    sensors: [SensorCalibration; SENSOR_COUNT],
    counts_per_mm: f64,
    z_offset: f64,
}

impl SensorGeometry {
    /// Lay the sensors out from the target configuration.
    ///
    /// # Panics
    ///
    /// If the configuration puts two neighbouring sensors on top of each other or produces
    /// non-finite positions. That is a corrupted calibration, not a shot-time condition.
    pub fn init_sensors(config: &TargetConfig) -> Self {
        let counts_per_mm = config.counts_per_mm();
        let radius = config.sensor_diameter_mm / 2.0;
        let off = |s: Sensor| config.sensor_offsets[s.index()];

        let mm = [
            Point::new(off(Sensor::North).x_mm, radius + off(Sensor::North).y_mm),
            Point::new(radius + off(Sensor::East).x_mm, off(Sensor::East).y_mm),
            Point::new(off(Sensor::South).x_mm, -(radius + off(Sensor::South).y_mm)),
            Point::new(-(radius + off(Sensor::West).x_mm), off(Sensor::West).y_mm),
        ];

        let mut sensors = [SensorCalibration::default(); SENSOR_COUNT];
        for s in Sensor::ALL {
            let here = mm[s.index()].scaled(counts_per_mm);
            let next = mm[s.clockwise().index()].scaled(counts_per_mm);
            let spacing = here.distance_to(next);
            assert!(
                spacing.is_finite() && spacing > 0.0,
                "corrupted sensor calibration at {}",
                s
            );
            sensors[s.index()] = SensorCalibration {
                sensor: s,
                position: here,
                diagonal: here.heading_to(next),
                spacing,
            };
        }

        Self {
            sensors,
            counts_per_mm,
            z_offset: config.z_offset_counts(),
        }
    }

    #[inline]
    pub fn sensor(&self, s: Sensor) -> &SensorCalibration {
        &self.sensors[s.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorCalibration> {
        self.sensors.iter()
    }

    #[inline]
    pub fn counts_per_mm(&self) -> f64 {
        self.counts_per_mm
    }

    /// Sensor-plane height above the paper, counts.
    #[inline]
    pub fn z_offset(&self) -> f64 {
        self.z_offset
    }

    #[inline]
    pub fn counts_to_mm(&self, counts: f64) -> f64 {
        counts / self.counts_per_mm
    }

    #[inline]
    pub fn mm_to_counts(&self, mm: f64) -> f64 {
        mm * self.counts_per_mm
    }
}
