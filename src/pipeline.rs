// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! One shot from capture snapshot to reported outcome.
//!
//! ```
//! use freetarget::timing::{Capture, SensorStatus};
//! use freetarget::{ShotOutcome, Target, TargetConfig};
//!
//! let mut target = Target::new(TargetConfig::default());
//! let capture = Capture::new(SensorStatus::ALL, [1000, 1050, 980, 1020]);
//! match target.process(&capture, false) {
//!     ShotOutcome::Hit(shot) => assert!(shot.radius < 1.0),
//!     ShotOutcome::Miss(miss) => panic!("missed: {}", miss.reason),
//! }
//! ```

use core::fmt;

use log::{debug, info, warn};

use crate::config::TargetConfig;
use crate::geometry::{rotate_hit, SensorGeometry};
use crate::report::Reporter;
use crate::shot::{build_hit, build_miss, Correction, MissRecord, ShotRecord};
use crate::solver::{compute_hit, correct_slant, Fix};
use crate::timing::{normalize, Capture};

/// What became of one shot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShotOutcome {
    Hit(ShotRecord),
    Miss(MissRecord),
}

impl ShotOutcome {
    pub fn shot(&self) -> u32 {
        match self {
            ShotOutcome::Hit(h) => h.shot,
            ShotOutcome::Miss(m) => m.shot,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, ShotOutcome::Hit(_))
    }
}

/// A configured target: calibration table plus the running shot count.
pub struct Target {
    geometry: SensorGeometry,
    config: TargetConfig,
    shots: u32,
}

impl Target {
    pub fn new(config: TargetConfig) -> Self {
        let geometry = SensorGeometry::init_sensors(&config);
        info!(
            "target ready: {} mm sensor circle, {} counts/mm",
            config.sensor_diameter_mm,
            geometry.counts_per_mm()
        );
        Self {
            geometry,
            config,
            shots: 0,
        }
    }

    pub fn geometry(&self) -> &SensorGeometry {
        &self.geometry
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Shots processed so far, hits and misses.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Locate one shot. Never fails; anything that cannot be located is a miss.
    ///
    /// `test_mode` skips the noise gate, for bench captures.
    pub fn process(&mut self, capture: &Capture, test_mode: bool) -> ShotOutcome {
        self.shots += 1;
        let shot = self.shots;

        let mut readings = match normalize(&self.geometry, capture) {
            Ok(r) => r,
            Err(e) => {
                warn!("shot {}: {}", shot, e);
                return ShotOutcome::Miss(build_miss(shot, capture, e));
            }
        };

        let solution = match compute_hit(&mut readings, test_mode, &self.config.planar_limits) {
            Ok(s) => s,
            Err(e) => {
                warn!("shot {}: {}", shot, e);
                return ShotOutcome::Miss(build_miss(shot, capture, e));
            }
        };

        let planar = Fix {
            position: rotate_hit(solution.location, solution.canonical.position),
            ..solution.canonical
        };

        let z = self.geometry.z_offset();
        let (fix, correction) = if z == 0.0 {
            (planar, Correction::Flat)
        } else {
            match correct_slant(&mut readings, &planar, z, &self.config.slant_limits) {
                Ok(fix) => (fix, Correction::Slant),
                Err(e) => {
                    warn!("shot {}: slant correction failed ({}), keeping planar fix", shot, e);
                    (planar, Correction::Fallback)
                }
            }
        };

        let record = build_hit(
            shot,
            &self.geometry,
            &self.config,
            capture,
            solution.location,
            &fix,
            correction,
        );
        debug!(
            "shot {}: ({}, {}) mm r={} a={} {}",
            shot,
            record.x,
            record.y,
            record.radius,
            record.angle,
            correction.label()
        );
        ShotOutcome::Hit(record)
    }

    /// [`process`](Self::process) and hand the outcome to `reporter`.
    pub fn process_and_report<R: Reporter>(
        &mut self,
        capture: &Capture,
        test_mode: bool,
        reporter: &mut R,
    ) -> Result<ShotOutcome, fmt::Error> {
        let outcome = self.process(capture, test_mode);
        match &outcome {
            ShotOutcome::Hit(h) => reporter.send_score(h)?,
            ShotOutcome::Miss(m) => reporter.send_miss(m)?,
        }
        Ok(outcome)
    }
}
