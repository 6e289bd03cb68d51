// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Planar multilateration.
//!
//! Counts are arrival times relative to the reference sensor, so every range is `count + E`
//! for one unknown `E`, the reference range. Each adjacent pair turns a trial `E` into a
//! candidate impact ([`solve_pair`]); the right `E` is the one where those candidates also sit
//! at the measured range from the remaining sensors.
//!
//! - Two or more pairs: bisection on the mean range residual. The residual is positive for
//!   small `E` (candidates pulled in towards the pair, too far from the others) and negative
//!   for large `E`. Done once the bracket is below tolerance and the candidates at both of its
//!   ends agree within tolerance.
//! - One pair: the problem is underdetermined, the impact is somewhere on a hyperbola branch.
//!   Golden-section search picks the point on it nearest the face centre.
//!
//! The fix is the plain average of the pairs whose triangles closed at the root. An impact past
//! one of the pair edges (inside the sensor circle, outside the square the sensors span) is found
//! by leaving that pair out of the root search and taking its far-side candidate.

use arrayvec::ArrayVec;
use log::{debug, trace};
use snafu::prelude::*;

use crate::error::{DegenerateGeometrySnafu, InsufficientSensorsSnafu, NotConvergedSnafu, ShotError};
use crate::geometry::{Location, Point, Quadrant, Sensor, SENSOR_COUNT};
use crate::solver::triangle::{is_beyond, solve_pair, PairFit, Side};
use crate::solver::{Fix, SolverLimits};
use crate::timing::{Readings, MIN_SENSORS};

/// Fixes farther from the centre than this many sensor radii are discarded.
const PLAUSIBLE_RADII: f64 = 2.0;

/// Samples across the bracket when its far end has the wrong sign.
const BRACKET_SCAN_STEPS: u32 = 16;

/// Result of the planar solve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Solution {
    /// Quadrant solved in and the physical sensors that took part.
    pub location: Location,
    /// Fix in the canonical frame. Use [`rotate_hit`](crate::geometry::rotate_hit) to bring it
    /// back to the face.
    pub canonical: Fix,
}

/// Locate the impact on the paper plane.
///
/// Drops noisy sensors first unless `test_mode` is set, rotates the readings so the reference
/// sensor is North, and solves there. Scratch fields of `readings` hold the last triangle of
/// every pair afterwards, in the physical frame.
pub fn compute_hit(readings: &mut Readings, test_mode: bool, limits: &SolverLimits) -> Result<Solution, ShotError> {
    if !test_mode {
        readings.gate_noise();
    }
    let sensors = readings.status();
    let valid = sensors.count();
    ensure!(valid >= MIN_SENSORS, InsufficientSensorsSnafu { valid });

    let location = Location {
        quadrant: Quadrant::of(readings.reference()),
        sensors,
    };
    let mut canonical = readings.rotated(location.quadrant);
    let result = locate(&mut canonical, 0.0, None, limits);
    readings.absorb_scratch(&canonical);
    let fix = result?;

    ensure!(
        fix.position.norm() <= PLAUSIBLE_RADII * readings.extent(),
        DegenerateGeometrySnafu {
            reason: "fix outside the sensor circle"
        }
    );
    debug!(
        "planar fix ({}, {}) in {:?}, {} pairs, {} steps",
        fix.position.x, fix.position.y, location.quadrant, fix.pairs, fix.iterations
    );

    Ok(Solution {
        location,
        canonical: fix,
    })
}

/// Candidates for one trial reference range.
struct Evaluation {
    /// Mean range residual against the sensors outside each pair.
    residual: Option<f64>,
    /// Mean absolute range residual.
    spread: Option<f64>,
    /// Mean of every reachable candidate.
    all: Option<Point>,
    /// Mean of the candidates whose triangle closed.
    usable: Option<Point>,
    usable_pairs: usize,
}

#[derive(Default)]
struct Mean {
    x: f64,
    y: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, p: Point) {
        self.x += p.x;
        self.y += p.y;
        self.n += 1;
    }

    fn get(&self) -> Option<Point> {
        (self.n > 0).then(|| Point::new(self.x / self.n as f64, self.y / self.n as f64))
    }
}

fn evaluate(readings: &mut Readings, pairs: &[(Sensor, Sensor)], estimate: f64, z: f64) -> Evaluation {
    let mut residual = 0.0;
    let mut spread = 0.0;
    let mut terms = 0usize;
    let mut all = Mean::default();
    let mut usable = Mean::default();

    for &(i, j) in pairs {
        let next = *readings.get(j);
        let fit = solve_pair(readings.get_mut(i), &next, Side::Face, estimate, z);
        if fit == PairFit::Unreachable {
            continue;
        }
        let candidate = readings.get(i).candidate();
        all.push(candidate);
        if fit.is_usable() {
            usable.push(candidate);
        }

        for k in Sensor::ALL {
            let other = readings.get(k);
            if !other.is_valid || k == i || k == j {
                continue;
            }
            let d = other.position.distance_to(candidate);
            let r = libm::sqrt(d * d + z * z) - (other.count + estimate);
            residual += r;
            spread += libm::fabs(r);
            terms += 1;
        }
    }

    Evaluation {
        residual: (terms > 0).then(|| residual / terms as f64),
        spread: (terms > 0).then(|| spread / terms as f64),
        all: all.get(),
        usable: usable.get(),
        usable_pairs: usable.n,
    }
}

/// Reference range where the mean residual of one set of pairs crosses zero.
#[derive(Copy, Clone)]
struct Root {
    estimate: f64,
    iterations: u32,
}

/// A fix under one assumption about which pair edge, if any, the impact lies beyond.
#[derive(Copy, Clone)]
struct Candidate {
    root: Root,
    beyond: Option<(Sensor, Sensor)>,
    fix: Fix,
    spread: f64,
}

/// `pairs` without `skip`.
fn without(pairs: &[(Sensor, Sensor)], skip: Option<(Sensor, Sensor)>) -> ArrayVec<(Sensor, Sensor), SENSOR_COUNT> {
    pairs.iter().copied().filter(|&p| Some(p) != skip).collect()
}

/// Solve for the impact in whatever frame `readings` is in.
///
/// `z` is the sensor plane height in counts (zero for the planar solve). `seed` is a previous
/// reference range used to narrow the search bracket.
///
/// The impact is either inside every pair edge or past exactly one of them. The face-side solve
/// covers the first case. For the second, each pair in turn is left out of the search; such a
/// fix only counts if it really is past that pair's edge. The candidate whose ranges agree best
/// wins.
pub(crate) fn locate(
    readings: &mut Readings,
    z: f64,
    seed: Option<f64>,
    limits: &SolverLimits,
) -> Result<Fix, ShotError> {
    let pairs = readings.pairs();
    ensure!(
        !pairs.is_empty(),
        DegenerateGeometrySnafu {
            reason: "no adjacent sensor pair"
        }
    );

    let span = pairs
        .iter()
        .map(|&(i, j)| readings.get(i).position.distance_to(readings.get(j).position))
        .fold(0.0, f64::max);
    let z = libm::fabs(z);
    let lo = z + limits.tolerance;
    let hi = 2.0 * span + z;

    if pairs.len() == 1 {
        return nearest_on_branch(readings, pairs[0], lo, hi, z, limits);
    }

    let face = bisect(readings, &pairs, lo, hi, z, seed, limits)
        .and_then(|root| settle(readings, &pairs, None, root, z));
    let mut best = match &face {
        Ok(c) if !pairs.iter().any(|&p| past_edge(readings, p, c.fix.position)) => Some(*c),
        _ => None,
    };

    for &edge in &pairs {
        let rest = without(&pairs, Some(edge));
        let Ok(root) = bisect(readings, &rest, lo, hi, z, seed, limits) else {
            continue;
        };
        let Ok(candidate) = settle(readings, &pairs, Some(edge), root, z) else {
            continue;
        };
        if !past_edge(readings, edge, candidate.fix.position) {
            continue;
        }
        if best.map_or(true, |b| candidate.spread < b.spread) {
            best = Some(candidate);
        }
    }

    let best = match (best, face) {
        (Some(b), _) => b,
        (None, face) => face?,
    };
    if let Some((i, j)) = best.beyond {
        trace!("impact past the {:?}-{:?} edge", i, j);
    }
    // Leave the scratch fields holding the chosen triangles.
    settle(readings, &pairs, best.beyond, best.root, z).map(|c| c.fix)
}

fn past_edge(readings: &Readings, (i, j): (Sensor, Sensor), p: Point) -> bool {
    is_beyond(readings.get(i).position, readings.get(j).position, p)
}

/// Average the pairs used for `root`. A pair assumed `beyond` stays out of the average and gets
/// its far-side triangle.
fn settle(
    readings: &mut Readings,
    pairs: &[(Sensor, Sensor)],
    beyond: Option<(Sensor, Sensor)>,
    root: Root,
    z: f64,
) -> Result<Candidate, ShotError> {
    let eval = evaluate(readings, &without(pairs, beyond), root.estimate, z);
    if let Some((i, j)) = beyond {
        let next = *readings.get(j);
        solve_pair(readings.get_mut(i), &next, Side::Beyond, root.estimate, z);
    }

    let position = eval.usable.context(DegenerateGeometrySnafu {
        reason: "no triangle closes",
    })?;
    Ok(Candidate {
        root,
        beyond,
        fix: Fix {
            position,
            estimate: root.estimate,
            iterations: root.iterations,
            pairs: eval.usable_pairs,
        },
        spread: eval.spread.unwrap_or(0.0),
    })
}

fn bisect(
    readings: &mut Readings,
    pairs: &[(Sensor, Sensor)],
    mut lo: f64,
    mut hi: f64,
    z: f64,
    seed: Option<f64>,
    limits: &SolverLimits,
) -> Result<Root, ShotError> {
    let at_lo = evaluate(readings, pairs, lo, z);
    let mut at_hi = evaluate(readings, pairs, hi, z);

    // Past a second crossing the far end turns positive again; close in on the first one.
    if matches!(at_lo.residual, Some(f) if f > 0.0) && !matches!(at_hi.residual, Some(f) if f < 0.0) {
        let width = (hi - lo) / f64::from(BRACKET_SCAN_STEPS);
        for n in 1..BRACKET_SCAN_STEPS {
            let x = lo + width * f64::from(n);
            let at_x = evaluate(readings, pairs, x, z);
            if matches!(at_x.residual, Some(f) if f < 0.0) {
                hi = x;
                at_hi = at_x;
                break;
            }
        }
    }
    match (at_lo.residual, at_hi.residual) {
        (Some(a), Some(b)) if a > 0.0 && b < 0.0 => {}
        _ => {
            return DegenerateGeometrySnafu {
                reason: "no range root in bracket",
            }
            .fail()
        }
    }
    let (mut p_lo, mut p_hi) = (at_lo.all, at_hi.all);

    if let Some(seed) = seed.filter(|&s| s > lo && s < hi) {
        let at_seed = evaluate(readings, pairs, seed, z);
        match at_seed.residual {
            Some(f) if f > 0.0 => (lo, p_lo) = (seed, at_seed.all),
            Some(_) => (hi, p_hi) = (seed, at_seed.all),
            None => {}
        }
    }

    for step in 1..=limits.max_iterations {
        let mid = 0.5 * (lo + hi);
        let eval = evaluate(readings, pairs, mid, z);
        let (residual, all) = match (eval.residual, eval.all) {
            (Some(r), Some(p)) => (r, p),
            _ => {
                return DegenerateGeometrySnafu {
                    reason: "every pair unreachable",
                }
                .fail()
            }
        };
        trace!("bisect step {} range {} residual {}", step, mid, residual);

        if residual > 0.0 {
            (lo, p_lo) = (mid, Some(all));
        } else {
            (hi, p_hi) = (mid, Some(all));
        }

        // Both ends of the bracket must agree on the impact, not just on the range.
        let agreed = matches!((p_lo, p_hi), (Some(a), Some(b)) if a.distance_to(b) < limits.tolerance);
        if hi - lo < limits.tolerance && agreed {
            ensure!(
                eval.usable.is_some(),
                DegenerateGeometrySnafu {
                    reason: "no triangle closes"
                }
            );
            return Ok(Root {
                estimate: mid,
                iterations: step,
            });
        }
    }

    NotConvergedSnafu {
        iterations: limits.max_iterations,
    }
    .fail()
}

/// Golden-section search along one pair's hyperbola branch for the point nearest the centre.
fn nearest_on_branch(
    readings: &mut Readings,
    (i, j): (Sensor, Sensor),
    lo: f64,
    hi: f64,
    z: f64,
    limits: &SolverLimits,
) -> Result<Fix, ShotError> {
    let next = *readings.get(j);
    let mut distance = |estimate: f64| {
        let s = readings.get_mut(i);
        match solve_pair(s, &next, Side::Face, estimate, z) {
            PairFit::Unreachable => f64::INFINITY,
            _ => s.candidate().norm(),
        }
    };

    let ratio = (libm::sqrt(5.0) - 1.0) / 2.0;
    let (mut a, mut b) = (lo, hi);
    let mut x1 = b - ratio * (b - a);
    let mut x2 = a + ratio * (b - a);
    let mut f1 = distance(x1);
    let mut f2 = distance(x2);
    let mut steps = 0;

    while b - a >= limits.tolerance {
        ensure!(
            steps < limits.max_iterations,
            NotConvergedSnafu {
                iterations: limits.max_iterations
            }
        );
        steps += 1;
        if f1 < f2 {
            b = x2;
            x2 = x1;
            f2 = f1;
            x1 = b - ratio * (b - a);
            f1 = distance(x1);
        } else {
            a = x1;
            x1 = x2;
            f1 = f2;
            x2 = a + ratio * (b - a);
            f2 = distance(x2);
        }
    }

    let estimate = 0.5 * (a + b);
    let s = readings.get_mut(i);
    let fit = solve_pair(s, &next, Side::Face, estimate, z);
    ensure!(
        fit.is_usable(),
        DegenerateGeometrySnafu {
            reason: "no triangle closes"
        }
    );

    Ok(Fix {
        position: s.candidate(),
        estimate,
        iterations: steps,
        pairs: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use crate::geometry::{rotate_hit, SensorGeometry};
    use crate::geometry::SENSOR_COUNT;
    use crate::timing::{normalize, Capture, SensorStatus};
    use approx::assert_abs_diff_eq;
    use core::f64::consts::FRAC_PI_4;

    fn geometry() -> SensorGeometry {
        SensorGeometry::init_sensors(&TargetConfig::default())
    }

    /// Arrival counts for an impact at `hit` (counts), offset by a trigger delay.
    fn arrivals(g: &SensorGeometry, hit: Point, delay: f64) -> [f64; SENSOR_COUNT] {
        Sensor::ALL.map(|s| delay + g.sensor(s).position.distance_to(hit))
    }

    fn solve(g: &SensorGeometry, status: SensorStatus, counts: [f64; SENSOR_COUNT]) -> Result<Point, ShotError> {
        let mut r = Readings::from_counts(g, status, counts)?;
        let sol = compute_hit(&mut r, true, &SolverLimits::default())?;
        Ok(rotate_hit(sol.location, sol.canonical.position))
    }

    #[test]
    fn recovers_impact_from_every_three_and_four_sensor_subset() {
        let g = geometry();
        let hits = [
            Point::new(200.0, 100.0),
            Point::new(-350.0, 820.0),
            Point::new(-1100.0, -400.0),
            Point::new(40.0, -1500.0),
            Point::ORIGIN,
        ];
        for hit in hits {
            let counts = arrivals(&g, hit, 1234.5);
            for bits in [0b1111, 0b0111, 0b1110, 0b1101, 0b1011] {
                let p = solve(&g, SensorStatus::from_bits(bits), counts).unwrap();
                assert_abs_diff_eq!(p.x, hit.x, epsilon = 0.5);
                assert_abs_diff_eq!(p.y, hit.y, epsilon = 0.5);
            }
        }
    }

    #[test]
    fn recovers_impacts_between_the_square_and_the_sensor_circle() {
        let g = geometry();
        let radius = g.sensor(Sensor::North).position.y;
        for step in 0..24 {
            let heading = f64::from(step) * 15.0_f64.to_radians();
            for scale in [0.75, 0.85, 0.95, 0.98] {
                let hit = Point::new(scale * radius, 0.0).rotated(heading + 0.1);
                let counts = arrivals(&g, hit, 321.0);
                for bits in [0b1111, 0b0111, 0b1110, 0b1101, 0b1011] {
                    let p = solve(&g, SensorStatus::from_bits(bits), counts).unwrap();
                    assert!(p.distance_to(hit) < 0.05, "{:?} solved as {:?} with {:04b}", hit, p, bits);
                }
            }
        }
    }

    #[test]
    fn impact_past_an_edge_leaves_that_pair_on_its_far_side() {
        let g = geometry();
        // Past the North-East edge, inside the sensor circle.
        let hit = g.sensor(Sensor::North).position.rotated(-FRAC_PI_4).scaled(0.9);
        let mut r = Readings::from_counts(&g, SensorStatus::ALL, arrivals(&g, hit, 0.0)).unwrap();
        let sol = compute_hit(&mut r, true, &SolverLimits::default()).unwrap();

        assert_eq!(sol.canonical.pairs, 3);
        let p = rotate_hit(sol.location, sol.canonical.position);
        assert_abs_diff_eq!(p.x, hit.x, epsilon = 0.05);
        assert_abs_diff_eq!(p.y, hit.y, epsilon = 0.05);
        for s in Sensor::ALL {
            assert_abs_diff_eq!(r.get(s).xs, hit.x, epsilon = 0.5);
            assert_abs_diff_eq!(r.get(s).ys, hit.y, epsilon = 0.5);
        }
    }

    #[test]
    fn bench_capture_solves_in_the_south_quadrant() {
        let g = geometry();
        let capture = Capture::new(SensorStatus::ALL, [1000, 1050, 980, 1020]);
        let mut r = normalize(&g, &capture).unwrap();
        let sol = compute_hit(&mut r, false, &SolverLimits::default()).unwrap();

        assert_eq!(sol.location.quadrant, Quadrant::South);
        assert_eq!(sol.location.sensors, SensorStatus::ALL);
        assert_eq!(sol.canonical.pairs, 4);

        let p = rotate_hit(sol.location, sol.canonical.position);
        assert_abs_diff_eq!(p.x, -15.0, epsilon = 0.5);
        assert_abs_diff_eq!(p.y, -10.0, epsilon = 0.5);
    }

    #[test]
    fn scratch_is_left_in_the_physical_frame() {
        let g = geometry();
        let hit = Point::new(200.0, 100.0);
        let mut r = Readings::from_counts(&g, SensorStatus::ALL, arrivals(&g, hit, 0.0)).unwrap();
        compute_hit(&mut r, true, &SolverLimits::default()).unwrap();

        for s in Sensor::ALL {
            assert_abs_diff_eq!(r.get(s).xs, hit.x, epsilon = 0.5);
            assert_abs_diff_eq!(r.get(s).ys, hit.y, epsilon = 0.5);
        }
    }

    #[test]
    fn adjacent_pair_still_gives_a_fix() {
        let g = geometry();
        let counts = arrivals(&g, Point::new(200.0, 100.0), 0.0);
        for bits in [0b0011, 0b0110, 0b1100, 0b1001] {
            let p = solve(&g, SensorStatus::from_bits(bits), counts).unwrap();
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.norm() < g.sensor(Sensor::North).position.norm());
        }
    }

    #[test]
    fn adjacent_pair_fix_keeps_the_measured_difference() {
        let g = geometry();
        let counts = arrivals(&g, Point::new(200.0, 100.0), 0.0);
        let p = solve(&g, SensorStatus::from_bits(0b0011), counts).unwrap();

        let north = g.sensor(Sensor::North).position.distance_to(p);
        let east = g.sensor(Sensor::East).position.distance_to(p);
        assert_abs_diff_eq!(north - east, counts[0] - counts[1], epsilon = 0.05);
    }

    #[test]
    fn opposite_pair_is_degenerate() {
        let g = geometry();
        let counts = arrivals(&g, Point::new(200.0, 100.0), 0.0);
        for bits in [0b0101, 0b1010] {
            assert!(matches!(
                solve(&g, SensorStatus::from_bits(bits), counts),
                Err(ShotError::DegenerateGeometry { .. })
            ));
        }
    }

    #[test]
    fn single_sensor_is_insufficient() {
        let g = geometry();
        let counts = arrivals(&g, Point::new(200.0, 100.0), 0.0);
        assert_eq!(
            solve(&g, SensorStatus::from_bits(0b0001), counts),
            Err(ShotError::InsufficientSensors { valid: 1 })
        );
    }

    #[test]
    fn later_arrival_pushes_the_impact_away_from_that_sensor() {
        let g = geometry();
        let base = arrivals(&g, Point::new(200.0, 100.0), 500.0);
        let p0 = solve(&g, SensorStatus::ALL, base).unwrap();

        let shifted = |s: Sensor| {
            let mut counts = base;
            counts[s.index()] += 5.0;
            let p = solve(&g, SensorStatus::ALL, counts).unwrap();
            Point::new(p.x - p0.x, p.y - p0.y)
        };

        assert!(shifted(Sensor::North).y < -1.0);
        assert!(shifted(Sensor::East).x < -1.0);
        assert!(shifted(Sensor::South).y > 1.0);
        assert!(shifted(Sensor::West).x > 1.0);
    }

    #[test]
    fn noise_gate_only_outside_test_mode() {
        let g = geometry();
        let counts = [1000.0, 1000.0, 1000.0, 10_000.0];

        let mut gated = Readings::from_counts(&g, SensorStatus::ALL, counts).unwrap();
        let sol = compute_hit(&mut gated, false, &SolverLimits::default()).unwrap();
        assert_eq!(sol.location.sensors.bits(), 0b0111);
        assert_abs_diff_eq!(sol.canonical.position.norm(), 0.0, epsilon = 0.5);

        let mut raw = Readings::from_counts(&g, SensorStatus::ALL, counts).unwrap();
        let sol = compute_hit(&mut raw, true, &SolverLimits::default()).unwrap();
        assert_eq!(sol.location.sensors, SensorStatus::ALL);
        assert!(sol.canonical.position.norm() > 100.0);
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let g = geometry();
        let counts = arrivals(&g, Point::new(200.0, 100.0), 0.0);
        let mut r = Readings::from_counts(&g, SensorStatus::ALL, counts).unwrap();
        let limits = SolverLimits::default().with_max_iterations(3);
        assert_eq!(
            compute_hit(&mut r, true, &limits),
            Err(ShotError::NotConverged { iterations: 3 })
        );
    }
}
