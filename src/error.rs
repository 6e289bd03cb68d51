// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Errors raised while locating a shot.
//!
//! None of these escape [`Target::process`](crate::pipeline::Target::process): every variant
//! degrades to a miss, or for the slant corrector to the uncorrected fix.

use snafu::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ShotError {
    #[snafu(display("insufficient sensors: valid={valid}"))]
    InsufficientSensors { valid: usize },
    #[snafu(display("degenerate geometry: {reason}"))]
    DegenerateGeometry { reason: &'static str },
    #[snafu(display("no convergence after {iterations} iterations"))]
    NotConverged { iterations: u32 },
}

impl ShotError {
    /// Short machine-friendly tag used by the reporters.
    pub fn tag(&self) -> &'static str {
        match self {
            ShotError::InsufficientSensors { .. } => "sensors",
            ShotError::DegenerateGeometry { .. } => "geometry",
            ShotError::NotConverged { .. } => "convergence",
        }
    }
}
