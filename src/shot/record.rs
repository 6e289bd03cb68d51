// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Finished shot records handed to the reporters.

use crate::config::TargetConfig;
use crate::error::ShotError;
use crate::geometry::{Location, Point, SensorGeometry};
use crate::solver::Fix;
use crate::timing::{Capture, RawTimers, SensorStatus};

/// Which solve produced the reported position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Correction {
    /// Planar solve, no sensor height configured.
    Flat,
    /// Slant-corrected.
    Slant,
    /// Slant correction failed; planar solve reported instead.
    Fallback,
}

impl Correction {
    pub fn label(self) -> &'static str {
        match self {
            Correction::Flat => "flat",
            Correction::Slant => "slant",
            Correction::Fallback => "fallback",
        }
    }
}

/// A located shot. Distances in mm, angle in degrees counter-clockwise from `+x`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShotRecord {
    /// 1-based sequence number.
    pub shot: u32,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub angle: f64,
    pub correction: Correction,
    pub location: Location,
    /// Raw capture counts.
    pub counters: RawTimers,
    /// Range from the reference sensor to the impact, mm.
    pub estimate: f64,
    pub iterations: u32,
    pub score: f64,
}

impl ShotRecord {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A shot that could not be located.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MissRecord {
    pub shot: u32,
    pub status: SensorStatus,
    pub counters: RawTimers,
    pub reason: ShotError,
}

/// Build the record for a located shot from its physical-frame fix.
pub fn build_hit(
    shot: u32,
    geometry: &SensorGeometry,
    config: &TargetConfig,
    capture: &Capture,
    location: Location,
    fix: &Fix,
    correction: Correction,
) -> ShotRecord {
    let mm = Point::new(
        geometry.counts_to_mm(fix.position.x),
        geometry.counts_to_mm(fix.position.y),
    );
    let p = config.alignment.apply(mm);
    let radius = p.norm();

    ShotRecord {
        shot,
        x: p.x,
        y: p.y,
        radius,
        angle: libm::atan2(p.y, p.x).to_degrees(),
        correction,
        location,
        counters: capture.timers,
        estimate: geometry.counts_to_mm(fix.estimate),
        iterations: fix.iterations,
        score: config.face.score(radius, config.caliber_mm),
    }
}

pub fn build_miss(shot: u32, capture: &Capture, reason: ShotError) -> MissRecord {
    MissRecord {
        shot,
        status: capture.status,
        counters: capture.timers,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaceAlignment;
    use crate::geometry::Quadrant;
    use approx::assert_abs_diff_eq;

    fn fix_at(x: f64, y: f64) -> Fix {
        Fix {
            position: Point::new(x, y),
            estimate: 2330.9,
            iterations: 20,
            pairs: 4,
        }
    }

    fn location() -> Location {
        Location {
            quadrant: Quadrant::North,
            sensors: SensorStatus::ALL,
        }
    }

    #[test]
    fn counts_become_millimetres_and_polar() {
        let config = TargetConfig::default();
        let g = SensorGeometry::init_sensors(&config);
        let k = g.counts_per_mm();
        let capture = Capture::new(SensorStatus::ALL, [1, 2, 3, 4]);

        let rec = build_hit(7, &g, &config, &capture, location(), &fix_at(-3.0 * k, -4.0 * k), Correction::Flat);
        assert_eq!(rec.shot, 7);
        assert_abs_diff_eq!(rec.x, -3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rec.y, -4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rec.radius, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rec.angle, -126.869_897_645, epsilon = 1e-6);
        assert_abs_diff_eq!(rec.estimate, 2330.9 / k, epsilon = 1e-9);
        assert_abs_diff_eq!(rec.score, 11.0 - 5.0 / 48.25, epsilon = 1e-9);
        assert_eq!(rec.counters, RawTimers([1, 2, 3, 4]));
    }

    #[test]
    fn alignment_is_applied_before_polar() {
        let config = TargetConfig::default().with_alignment(FaceAlignment {
            x_offset_mm: 0.0,
            y_offset_mm: 10.0,
            angle_deg: 0.0,
        });
        let g = SensorGeometry::init_sensors(&config);
        let capture = Capture::default();

        let rec = build_hit(1, &g, &config, &capture, location(), &fix_at(0.0, 0.0), Correction::Slant);
        assert_abs_diff_eq!(rec.y, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rec.radius, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rec.angle, 90.0, epsilon = 1e-12);
    }

    #[test]
    fn miss_keeps_the_capture() {
        let capture = Capture::new(SensorStatus::from_bits(0b0001), [9, 0, 0, 0]);
        let miss = build_miss(3, &capture, ShotError::InsufficientSensors { valid: 1 });
        assert_eq!(miss.status.bits(), 1);
        assert_eq!(miss.counters.get(crate::geometry::Sensor::North), 9);
        assert_eq!(miss.reason.tag(), "sensors");
    }
}
