// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Triangle solve for one adjacent sensor pair.
//!
//! Sensor `i`, its clockwise neighbour `j` and the impact form a triangle: `a` is the planar
//! range from `i`, `b` the planar range from `j`, `c` the sensor spacing. The law of cosines
//! gives the interior angle at `i`, and walking `a` from `i` at that angle off the `i → j` edge
//! lands on the impact. The sensors run clockwise, so the face is on the right of every edge.
//! An impact between an edge and the sensor circle sits on the left, at the same angle mirrored
//! across the edge ([`Side::Beyond`]).

use crate::geometry::Point;
use crate::timing::SensorReading;

/// How far a cosine may stray outside `[-1, 1]` from rounding alone.
pub const COSINE_EPSILON: f64 = 1e-6;

/// Quality of one triangle solve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PairFit {
    /// Cosine in range.
    Exact,
    /// Cosine outside the range by no more than [`COSINE_EPSILON`]; clamped.
    Clamped,
    /// Cosine well outside the range. Clamped so searches see a continuous candidate, but the
    /// ranges do not close a triangle.
    Saturated,
    /// No planar range exists (negative squared term) or the arithmetic produced NaN.
    Unreachable,
}

impl PairFit {
    /// Whether the candidate may go into a final fix.
    #[inline]
    pub fn is_usable(self) -> bool {
        matches!(self, PairFit::Exact | PairFit::Clamped)
    }
}

/// Which side of the `i → j` edge a pair's candidate is taken on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Side {
    /// Towards the face centre.
    #[default]
    Face,
    /// Past the edge, towards the sensor circle.
    Beyond,
}

/// Whether `p` lies past the clockwise edge `from → to`, away from the face centre.
#[inline]
pub fn is_beyond(from: Point, to: Point, p: Point) -> bool {
    let (ex, ey) = (to.x - from.x, to.y - from.y);
    ex * (p.y - from.y) - ey * (p.x - from.x) > 0.0
}

/// Interior angle opposite side `b`, radians.
pub fn interior_angle(a: f64, b: f64, c: f64) -> (f64, PairFit) {
    if a * c == 0.0 {
        return (0.0, PairFit::Exact);
    }
    let cos_a = (a * a + c * c - b * b) / (2.0 * a * c);
    if !cos_a.is_finite() {
        return (0.0, PairFit::Unreachable);
    }

    let fit = if (-1.0..=1.0).contains(&cos_a) {
        PairFit::Exact
    } else if cos_a - 1.0 <= COSINE_EPSILON && -1.0 - cos_a <= COSINE_EPSILON {
        PairFit::Clamped
    } else {
        PairFit::Saturated
    };
    (libm::acos(cos_a.clamp(-1.0, 1.0)), fit)
}

/// Planar triangle sides for `s` and its clockwise neighbour `next`, given the reference range
/// `estimate` and the sensor plane height `z_offset` (both counts).
///
/// Fills `s.a`, `s.b` and `s.c`. Returns false when either slant range is shorter than the
/// height, leaving the scratch untouched.
pub fn find_xy_3d(s: &mut SensorReading, next: &SensorReading, estimate: f64, z_offset: f64) -> bool {
    let z2 = z_offset * z_offset;
    let a2 = (s.count + estimate) * (s.count + estimate) - z2;
    let b2 = (next.count + estimate) * (next.count + estimate) - z2;
    if !(a2 >= 0.0 && b2 >= 0.0) {
        return false;
    }

    s.a = libm::sqrt(a2);
    s.b = libm::sqrt(b2);
    s.c = s.position.distance_to(next.position);
    true
}

/// Solve the triangle at `s` and store its candidate impact on `side` in `s.xs`, `s.ys`.
pub(crate) fn solve_pair(
    s: &mut SensorReading,
    next: &SensorReading,
    side: Side,
    estimate: f64,
    z_offset: f64,
) -> PairFit {
    if !find_xy_3d(s, next, estimate, z_offset) {
        return PairFit::Unreachable;
    }
    let (angle, fit) = interior_angle(s.a, s.b, s.c);
    if fit == PairFit::Unreachable {
        return fit;
    }

    let edge = s.position.heading_to(next.position);
    let heading = match side {
        Side::Face => edge - angle,
        Side::Beyond => edge + angle,
    };
    let hit = Point::new(
        s.position.x + s.a * libm::cos(heading),
        s.position.y + s.a * libm::sin(heading),
    );
    s.angle_a = angle;
    s.xs = hit.x;
    s.ys = hit.y;
    fit
}
