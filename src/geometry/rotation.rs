// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quadrant rotation.
//!
//! The sensors have 90° rotational symmetry, so the solver always works with the reference
//! sensor (the one the shock wave reached first) turned to North. A [`Quadrant`] names which
//! physical sensor that was and carries the exact transform between the two frames. Quarter
//! turns are coordinate swaps, so a round trip is exact.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::geometry::{Point, Sensor, SENSOR_COUNT};
use crate::timing::SensorStatus;

/// Physical quadrant the canonical solution belongs to, named by its reference sensor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Quadrant {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Quadrant {
    /// Quadrant whose canonical frame puts `reference` at North.
    pub fn of(reference: Sensor) -> Self {
        match reference {
            Sensor::North => Quadrant::North,
            Sensor::East => Quadrant::East,
            Sensor::South => Quadrant::South,
            Sensor::West => Quadrant::West,
        }
    }

    pub fn reference(self) -> Sensor {
        Sensor::from_index(self.quarter_turns())
    }

    /// Counter-clockwise quarter turns taking the physical frame to the canonical one.
    #[inline]
    pub fn quarter_turns(self) -> usize {
        self as usize
    }

    /// Physical coordinates → canonical coordinates.
    pub fn to_canonical(self, p: Point) -> Point {
        match self {
            Quadrant::North => p,
            Quadrant::East => Point::new(-p.y, p.x),
            Quadrant::South => Point::new(-p.x, -p.y),
            Quadrant::West => Point::new(p.y, -p.x),
        }
    }

    /// Canonical coordinates → physical coordinates.
    pub fn from_canonical(self, p: Point) -> Point {
        match self {
            Quadrant::North => p,
            Quadrant::East => Point::new(p.y, -p.x),
            Quadrant::South => Point::new(-p.x, -p.y),
            Quadrant::West => Point::new(-p.y, p.x),
        }
    }

    /// Slot a physical sensor occupies in the canonical frame.
    pub fn canonical_sensor(self, physical: Sensor) -> Sensor {
        Sensor::from_index(physical.index() + SENSOR_COUNT - self.quarter_turns())
    }

    /// Physical sensor sitting in a canonical slot.
    pub fn physical_sensor(self, canonical: Sensor) -> Sensor {
        Sensor::from_index(canonical.index() + self.quarter_turns())
    }
}

/// Which sensors produced a solution and which quadrant it was solved in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub quadrant: Quadrant,
    pub sensors: SensorStatus,
}

impl Location {
    /// Legacy single-byte location code: reference sensor in the low two bits, sensor mask in
    /// the high nibble.
    pub fn code(&self) -> u8 {
        u8::from(self.quadrant) | (self.sensors.bits() << 4)
    }
}

/// Rotate a canonical-frame hit back into the quadrant it was solved for.
#[inline]
pub fn rotate_hit(location: Location, canonical: Point) -> Point {
    location.quadrant.from_canonical(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Quadrant; 4] = [Quadrant::North, Quadrant::East, Quadrant::South, Quadrant::West];

    #[test]
    fn round_trip_is_exact() {
        let points = [
            Point::new(12.5, -3.25),
            Point::new(-2680.538, 0.001),
            Point::new(0.0, 0.0),
            Point::new(1e-9, 7e5),
        ];
        for q in ALL {
            for p in points {
                assert_eq!(q.from_canonical(q.to_canonical(p)), p);
                assert_eq!(q.to_canonical(q.from_canonical(p)), p);
            }
        }
    }

    #[test]
    fn reference_sensor_lands_on_north() {
        let r = 100.0;
        let layout = [
            Point::new(0.0, r),
            Point::new(r, 0.0),
            Point::new(0.0, -r),
            Point::new(-r, 0.0),
        ];
        for s in Sensor::ALL {
            let q = Quadrant::of(s);
            assert_eq!(q.to_canonical(layout[s.index()]), Point::new(0.0, r));
            assert_eq!(q.canonical_sensor(s), Sensor::North);
            assert_eq!(q.reference(), s);
        }
    }

    #[test]
    fn sensor_slots_follow_the_rotation() {
        let q = Quadrant::East;
        assert_eq!(q.canonical_sensor(Sensor::South), Sensor::East);
        assert_eq!(q.canonical_sensor(Sensor::North), Sensor::West);
        for s in Sensor::ALL {
            assert_eq!(q.physical_sensor(q.canonical_sensor(s)), s);
        }
    }

    #[test]
    fn rotate_hit_uses_the_location_quadrant() {
        let location = Location {
            quadrant: Quadrant::West,
            sensors: SensorStatus::ALL,
        };
        assert_eq!(rotate_hit(location, Point::new(0.0, 5.0)), Point::new(-5.0, 0.0));
        assert_eq!(location.code(), 0xF3);
    }

    #[test]
    fn legacy_codes_convert() {
        assert_eq!(Quadrant::try_from(2u8).ok(), Some(Quadrant::South));
        assert!(Quadrant::try_from(9u8).is_err());
    }
}
