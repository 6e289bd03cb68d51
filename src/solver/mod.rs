// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Impact Solver
//!
//! Multilateration from relative arrival counts.
//!
//! ## Modules
//!
//! - [`triangle`] - Law-of-cosines solve for one adjacent sensor pair.
//! - [`multilateration`] - Planar fix in the canonical quadrant ([`compute_hit`]).
//! - [`slant`] - Refinement for a sensor plane raised above the paper ([`correct_slant`]).
//!
//! Every search here is bounded by [`SolverLimits`], so the worst-case time per shot is fixed.

pub mod multilateration;
pub mod slant;
pub mod triangle;

pub use multilateration::{compute_hit, Solution};
pub use slant::correct_slant;
pub use triangle::{find_xy_3d, interior_angle, is_beyond, PairFit, Side, COSINE_EPSILON};

use crate::geometry::Point;

/// Iteration bounds shared by the planar and slant searches.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverLimits {
    /// Hard cap on search steps.
    pub max_iterations: u32,
    /// Convergence threshold on the impact point, counts.
    pub tolerance: f64,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_iterations: 64,
            tolerance: 0.001,
        }
    }
}

impl SolverLimits {
    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// A located impact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Fix {
    /// Impact point, counts.
    pub position: Point,
    /// Range from the reference sensor to the impact, counts.
    pub estimate: f64,
    /// Search steps spent.
    pub iterations: u32,
    /// Sensor pairs averaged into `position`.
    pub pairs: usize,
}
