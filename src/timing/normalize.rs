// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Capture snapshots and per-shot sensor readings.
//!
//! The capture hardware hands over one [`Capture`] per shot. [`normalize`] turns it into a
//! [`Readings`] table: every sensor's calibration copied in, validity taken from the status set,
//! and counts re-expressed relative to the earliest valid arrival (the reference sensor). The
//! table lives on the stack for exactly one shot; the solver writes its scratch fields into it.

use arrayvec::ArrayVec;
use log::warn;
use snafu::prelude::*;

use crate::error::{InsufficientSensorsSnafu, ShotError};
use crate::geometry::{Point, Quadrant, Sensor, SensorGeometry, SENSOR_COUNT};
use crate::timing::SensorStatus;

/// Fewest valid sensors a planar solve can start from.
pub const MIN_SENSORS: usize = 2;

/// A relative count above this multiple of the straight-line distance to the reference sensor
/// is physically impossible and treated as noise.
const NOISE_MARGIN: f64 = 1.05;

/// Raw capture counts, indexed by sensor channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTimers(pub [u32; SENSOR_COUNT]);

impl RawTimers {
    #[inline]
    pub fn get(&self, sensor: Sensor) -> u32 {
        self.0[sensor.index()]
    }
}

/// Immutable snapshot of one shot as latched by the capture hardware.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capture {
    pub status: SensorStatus,
    pub timers: RawTimers,
}

impl Capture {
    pub fn new(status: SensorStatus, timers: [u32; SENSOR_COUNT]) -> Self {
        Self {
            status,
            timers: RawTimers(timers),
        }
    }
}

/// Working record for one sensor during one shot.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SensorReading {
    /// Physical sensor this reading came from.
    pub sensor: Sensor,
    pub is_valid: bool,
    /// Interior angle at this sensor from the last triangle solve, radians.
    pub angle_a: f64,
    /// Heading towards the clockwise neighbour in the current frame.
    pub diagonal: f64,
    pub position: Point,
    /// Arrival relative to the reference sensor, counts.
    pub count: f64,
    /// Planar range from this sensor.
    pub a: f64,
    /// Planar range from the clockwise neighbour.
    pub b: f64,
    /// Distance to the clockwise neighbour.
    pub c: f64,
    /// Candidate impact from the triangle at this sensor.
    pub xs: f64,
    pub ys: f64,
}

impl SensorReading {
    pub fn candidate(&self) -> Point {
        Point::new(self.xs, self.ys)
    }
}

/// The per-shot sensor table.
///
/// Slots are indexed by [`Sensor`]. In the physical frame slot and sensor agree; after
/// [`Readings::rotated`] slot `North` holds the reference sensor and positions are canonical.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Readings {
    sensors: [SensorReading; SENSOR_COUNT],
    reference: Sensor,
    frame: Quadrant,
}

impl Readings {
    /// Build the table from per-sensor arrival counts.
    ///
    /// Counts may be fractional; [`normalize`] feeds it whole timer values.
    pub fn from_counts(
        geometry: &SensorGeometry,
        status: SensorStatus,
        counts: [f64; SENSOR_COUNT],
    ) -> Result<Self, ShotError> {
        let valid = status.count();
        ensure!(valid >= MIN_SENSORS, InsufficientSensorsSnafu { valid });

        let mut reference = Sensor::North;
        let mut earliest = f64::INFINITY;
        for s in status.iter() {
            if counts[s.index()] < earliest {
                earliest = counts[s.index()];
                reference = s;
            }
        }

        let mut sensors = [SensorReading::default(); SENSOR_COUNT];
        for cal in geometry.iter() {
            let s = cal.sensor;
            let is_valid = status.is_valid(s);
            sensors[s.index()] = SensorReading {
                sensor: s,
                is_valid,
                diagonal: cal.diagonal,
                position: cal.position,
                count: if is_valid { counts[s.index()] - earliest } else { 0.0 },
                ..SensorReading::default()
            };
        }

        Ok(Self {
            sensors,
            reference,
            frame: Quadrant::North,
        })
    }

    #[inline]
    pub fn get(&self, slot: Sensor) -> &SensorReading {
        &self.sensors[slot.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, slot: Sensor) -> &mut SensorReading {
        &mut self.sensors[slot.index()]
    }

    /// Physical sensor that heard the shot first.
    #[inline]
    pub fn reference(&self) -> Sensor {
        self.reference
    }

    /// Frame the positions are expressed in.
    #[inline]
    pub fn frame(&self) -> Quadrant {
        self.frame
    }

    /// Valid slots in the current frame.
    pub fn status(&self) -> SensorStatus {
        Sensor::ALL
            .into_iter()
            .filter(|&s| self.get(s).is_valid)
            .collect()
    }

    /// Valid physical sensors, whatever the frame.
    pub fn physical_status(&self) -> SensorStatus {
        self.sensors
            .iter()
            .filter(|r| r.is_valid)
            .map(|r| r.sensor)
            .collect()
    }

    /// Adjacent valid slot pairs `(slot, clockwise neighbour)`.
    pub fn pairs(&self) -> ArrayVec<(Sensor, Sensor), SENSOR_COUNT> {
        Sensor::ALL
            .into_iter()
            .filter(|&s| self.get(s).is_valid && self.get(s.clockwise()).is_valid)
            .map(|s| (s, s.clockwise()))
            .collect()
    }

    /// Copy of the table in `quadrant`'s canonical frame.
    pub fn rotated(&self, quadrant: Quadrant) -> Readings {
        let mut out = *self;
        for slot in Sensor::ALL {
            let mut r = self.sensors[quadrant.physical_sensor(slot).index()];
            r.position = quadrant.to_canonical(r.position);
            out.sensors[slot.index()] = r;
        }
        for slot in Sensor::ALL {
            let next = out.get(slot.clockwise()).position;
            let here = out.get_mut(slot);
            here.diagonal = here.position.heading_to(next);
        }
        out.frame = quadrant;
        out
    }

    /// Copy the solver scratch from a canonical table back onto the physical one, candidates
    /// rotated back into the physical frame.
    pub fn absorb_scratch(&mut self, canonical: &Readings) {
        let quadrant = canonical.frame;
        for r in canonical.sensors.iter() {
            let candidate = quadrant.from_canonical(r.candidate());
            let target = &mut self.sensors[r.sensor.index()];
            target.angle_a = r.angle_a;
            target.a = r.a;
            target.b = r.b;
            target.c = r.c;
            target.xs = candidate.x;
            target.ys = candidate.y;
        }
    }

    pub fn invalidate(&mut self, slot: Sensor) {
        self.get_mut(slot).is_valid = false;
    }

    /// Largest sensor distance from the face centre.
    pub fn extent(&self) -> f64 {
        self.sensors
            .iter()
            .map(|r| r.position.norm())
            .fold(0.0, f64::max)
    }

    /// Drop sensors whose relative count is longer than sound could take to cross from the
    /// reference sensor. Returns the number dropped.
    pub fn gate_noise(&mut self) -> usize {
        let origin = self.get(self.reference).position;
        let mut dropped = 0;
        for slot in Sensor::ALL {
            let r = self.get(slot);
            if !r.is_valid || r.sensor == self.reference {
                continue;
            }
            let limit = origin.distance_to(r.position) * NOISE_MARGIN;
            if r.count > limit {
                warn!("sensor {} count {} beyond {}, dropped", r.sensor, r.count, limit);
                self.invalidate(slot);
                dropped += 1;
            }
        }
        dropped
    }
}

/// Turn a capture snapshot into the per-shot sensor table.
pub fn normalize(geometry: &SensorGeometry, capture: &Capture) -> Result<Readings, ShotError> {
    let counts = capture.timers.0.map(f64::from);
    Readings::from_counts(geometry, capture.status, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use approx::assert_abs_diff_eq;

    fn geometry() -> SensorGeometry {
        SensorGeometry::init_sensors(&TargetConfig::default())
    }

    #[test]
    fn earliest_valid_sensor_is_the_reference() {
        let capture = Capture::new(SensorStatus::ALL, [1000, 1050, 980, 1020]);
        let r = normalize(&geometry(), &capture).unwrap();

        assert_eq!(r.reference(), Sensor::South);
        assert_eq!(r.get(Sensor::North).count, 20.0);
        assert_eq!(r.get(Sensor::East).count, 70.0);
        assert_eq!(r.get(Sensor::South).count, 0.0);
        assert_eq!(r.get(Sensor::West).count, 40.0);
    }

    #[test]
    fn masked_sensors_do_not_set_the_reference() {
        let capture = Capture::new(SensorStatus::from_bits(0b1011), [1000, 1050, 10, 1020]);
        let r = normalize(&geometry(), &capture).unwrap();

        assert_eq!(r.reference(), Sensor::North);
        assert!(!r.get(Sensor::South).is_valid);
        assert_eq!(r.get(Sensor::South).count, 0.0);
        assert_eq!(r.status().bits(), 0b1011);
    }

    #[test]
    fn ties_go_to_the_lowest_channel() {
        let capture = Capture::new(SensorStatus::ALL, [500, 400, 400, 600]);
        let r = normalize(&geometry(), &capture).unwrap();
        assert_eq!(r.reference(), Sensor::East);
    }

    #[test]
    fn one_sensor_is_insufficient() {
        let capture = Capture::new(SensorStatus::from_bits(0b0001), [1000, 1050, 980, 1020]);
        assert_eq!(
            normalize(&geometry(), &capture),
            Err(ShotError::InsufficientSensors { valid: 1 })
        );
    }

    #[test]
    fn pairs_follow_adjacency() {
        let g = geometry();
        let r = Readings::from_counts(&g, SensorStatus::from_bits(0b1101), [0.0; 4]).unwrap();
        let pairs = r.pairs();
        assert_eq!(
            pairs.as_slice(),
            &[(Sensor::South, Sensor::West), (Sensor::West, Sensor::North)]
        );

        let opposite = Readings::from_counts(&g, SensorStatus::from_bits(0b0101), [0.0; 4]).unwrap();
        assert!(opposite.pairs().is_empty());
    }

    #[test]
    fn rotation_puts_the_reference_in_the_north_slot() {
        let capture = Capture::new(SensorStatus::from_bits(0b0111), [1000, 1050, 980, 1020]);
        let r = normalize(&geometry(), &capture).unwrap();
        let c = r.rotated(Quadrant::of(r.reference()));

        let north = c.get(Sensor::North);
        assert_eq!(north.sensor, Sensor::South);
        assert_eq!(north.count, 0.0);
        assert_abs_diff_eq!(north.position.x, 0.0, epsilon = 1e-9);
        assert!(north.position.y > 0.0);
        assert_abs_diff_eq!(north.diagonal, -core::f64::consts::FRAC_PI_4, epsilon = 1e-12);

        // West was masked and now sits in the East slot.
        assert!(!c.get(Sensor::East).is_valid);
        assert_eq!(c.physical_status(), r.status());
    }

    #[test]
    fn noise_gate_drops_impossible_counts() {
        let mut r = Readings::from_counts(
            &geometry(),
            SensorStatus::ALL,
            [1000.0, 1000.0, 1000.0, 10_000.0],
        )
        .unwrap();
        assert_eq!(r.gate_noise(), 1);
        assert!(!r.get(Sensor::West).is_valid);
        assert_eq!(r.status().count(), 3);
    }

    #[test]
    fn noise_limit_scales_with_distance_to_the_reference() {
        let g = geometry();
        let radius = g.sensor(Sensor::North).position.y;
        // Same count: too late for the adjacent East, still possible for the opposite South.
        let late = 1.6 * radius;
        let mut r =
            Readings::from_counts(&g, SensorStatus::ALL, [0.0, late, late, 0.5 * radius]).unwrap();
        assert_eq!(r.reference, Sensor::North);
        assert_eq!(r.gate_noise(), 1);
        assert!(!r.get(Sensor::East).is_valid);
        assert!(r.get(Sensor::South).is_valid);
        assert!(r.get(Sensor::West).is_valid);
    }
}
