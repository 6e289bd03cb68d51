// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Target configuration.
//!
//! Everything the geometry engine needs to know about the physical target: where the sensors
//! sit, how fast sound travels today, how fast the capture timer ticks, and how the paper face is
//! aligned to the sensor frame. Build one with [`TargetConfig::default`] and the `with_*`
//! helpers:
//!
//! ```
//! use freetarget::config::{SensorOffset, TargetConfig};
//! use freetarget::geometry::Sensor;
//!
//! let config = TargetConfig::default()
//!     .with_sensor_diameter_mm(300.0)
//!     .with_temperature_c(12.5)
//!     .with_sensor_offset(Sensor::East, SensorOffset::new(0.5, -0.25));
//! assert!(config.counts_per_mm() > 20.0);
//! ```

use crate::geometry::{Point, Sensor, SENSOR_COUNT};
use crate::shot::score::{TargetFace, NRA_B38};
use crate::solver::SolverLimits;

/// Nominal diameter of the circle the four sensors sit on.
pub const DEFAULT_SENSOR_DIAMETER_MM: f64 = 230.0;
/// Capture timer tick rate.
pub const DEFAULT_CLOCK_MHZ: f64 = 8.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 20.0;
/// .177 pellet
pub const DEFAULT_CALIBER_MM: f64 = 4.5;

/// Speed of sound in dry air at 0 °C, m/s.
const SPEED_OF_SOUND_0C: f64 = 331.3;
const KELVIN_OFFSET: f64 = 273.15;

/// Mounting error of one sensor relative to its nominal spot on the sensor circle.
///
/// Positive `x_mm` / `y_mm` push the sensor outward along its own axis for the radial
/// component (North `y`, East `x`, South `y`, West `x`) and along the face axes otherwise.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SensorOffset {
    pub x_mm: f64,
    pub y_mm: f64,
}

impl SensorOffset {
    pub const fn new(x_mm: f64, y_mm: f64) -> Self {
        Self { x_mm, y_mm }
    }
}

/// Paper-to-sensor alignment entered during calibration.
///
/// Applied to every hit after it has been converted to millimetres: rotate about the face
/// centre by `angle_deg` (counter-clockwise), then shift by the offsets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FaceAlignment {
    pub x_offset_mm: f64,
    pub y_offset_mm: f64,
    pub angle_deg: f64,
}

impl FaceAlignment {
    pub fn apply(&self, p: Point) -> Point {
        let p = if self.angle_deg == 0.0 {
            p
        } else {
            p.rotated(self.angle_deg.to_radians())
        };
        Point::new(p.x + self.x_offset_mm, p.y + self.y_offset_mm)
    }
}

/// Complete description of one target.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetConfig {
    pub sensor_diameter_mm: f64,
    /// Indexed by [`Sensor::index`].
    pub sensor_offsets: [SensorOffset; SENSOR_COUNT],
    pub temperature_c: f64,
    pub clock_mhz: f64,
    /// Height of the sensor plane above the paper.
    pub z_offset_mm: f64,
    pub caliber_mm: f64,
    pub alignment: FaceAlignment,
    pub face: TargetFace,
    /// Bounds for the flat multilateration solve.
    pub planar_limits: SolverLimits,
    /// Bounds for the slant-range refinement.
    pub slant_limits: SolverLimits,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            sensor_diameter_mm: DEFAULT_SENSOR_DIAMETER_MM,
            sensor_offsets: [SensorOffset::default(); SENSOR_COUNT],
            temperature_c: DEFAULT_TEMPERATURE_C,
            clock_mhz: DEFAULT_CLOCK_MHZ,
            z_offset_mm: 0.0,
            caliber_mm: DEFAULT_CALIBER_MM,
            alignment: FaceAlignment::default(),
            face: NRA_B38,
            planar_limits: SolverLimits::default(),
            slant_limits: SolverLimits::default(),
        }
    }
}

impl TargetConfig {
    pub fn with_sensor_diameter_mm(mut self, mm: f64) -> Self {
        self.sensor_diameter_mm = mm;
        self
    }

    pub fn with_sensor_offset(mut self, sensor: Sensor, offset: SensorOffset) -> Self {
        self.sensor_offsets[sensor.index()] = offset;
        self
    }

    pub fn with_temperature_c(mut self, celsius: f64) -> Self {
        self.temperature_c = celsius;
        self
    }

    pub fn with_clock_mhz(mut self, mhz: f64) -> Self {
        self.clock_mhz = mhz;
        self
    }

    pub fn with_z_offset_mm(mut self, mm: f64) -> Self {
        self.z_offset_mm = mm;
        self
    }

    pub fn with_caliber_mm(mut self, mm: f64) -> Self {
        self.caliber_mm = mm;
        self
    }

    pub fn with_alignment(mut self, alignment: FaceAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_face(mut self, face: TargetFace) -> Self {
        self.face = face;
        self
    }

    /// Set the iteration bounds for both the flat solve and the slant refinement.
    pub fn with_limits(mut self, planar: SolverLimits, slant: SolverLimits) -> Self {
        self.planar_limits = planar;
        self.slant_limits = slant;
        self
    }

    /// Speed of sound at the configured temperature, in mm/µs.
    pub fn speed_of_sound_mm_per_us(&self) -> f64 {
        let m_per_s = SPEED_OF_SOUND_0C * libm::sqrt(1.0 + self.temperature_c / KELVIN_OFFSET);
        m_per_s / 1000.0
    }

    /// Timer counts elapsed while sound travels one millimetre.
    pub fn counts_per_mm(&self) -> f64 {
        self.clock_mhz / self.speed_of_sound_mm_per_us()
    }

    /// Sensor-plane height expressed in timer counts.
    pub fn z_offset_counts(&self) -> f64 {
        self.z_offset_mm * self.counts_per_mm()
    }
}
