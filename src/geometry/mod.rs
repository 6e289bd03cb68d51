// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Target Geometry
//!
//! Static description of the sensor layout and the symmetry the solver exploits.
//!
//! ## Modules
//!
//! - [`sensors`] - Sensor identities and the calibrated geometry table.
//! - [`rotation`] - Quadrant transforms between the canonical and the physical frame.
//!
//! All coordinates are in timer counts (the distance sound travels in one tick) unless a name
//! says otherwise, so ranges and timer values can be mixed freely. Origin is the face centre,
//! `+x` points East and `+y` North.

pub mod rotation;
pub mod sensors;

pub use rotation::{rotate_hit, Location, Quadrant};
pub use sensors::{Sensor, SensorCalibration, SensorGeometry, SENSOR_COUNT};

/// A point on the target plane.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the face centre.
    #[inline]
    pub fn norm(self) -> f64 {
        libm::hypot(self.x, self.y)
    }

    #[inline]
    pub fn distance_to(self, other: Point) -> f64 {
        libm::hypot(other.x - self.x, other.y - self.y)
    }

    /// Heading from `self` towards `other`, radians, counter-clockwise from `+x`.
    #[inline]
    pub fn heading_to(self, other: Point) -> f64 {
        libm::atan2(other.y - self.y, other.x - self.x)
    }

    /// Rotate about the origin by `angle` radians, counter-clockwise.
    pub fn rotated(self, angle: f64) -> Point {
        let (s, c) = (libm::sin(angle), libm::cos(angle));
        Point::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    pub fn scaled(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}
