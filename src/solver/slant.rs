// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slant-range correction.
//!
//! With the sensors raised above the paper the measured ranges are slant ranges, longer than
//! the planar ones the flat solve assumed, which pulls the fix towards the centre. Re-solving
//! with the height folded into every triangle ([`find_xy_3d`](super::find_xy_3d)) removes the
//! bias. The planar reference range seeds the search.

use log::debug;

use crate::error::ShotError;
use crate::solver::multilateration::locate;
use crate::solver::{Fix, SolverLimits};
use crate::timing::Readings;

/// Refine a planar fix for a sensor plane `z_offset` counts above the paper.
///
/// `readings` and `planar` must both be in the physical frame. A zero offset returns `planar`
/// unchanged. Errors are recoverable: the caller keeps the planar fix.
pub fn correct_slant(
    readings: &mut Readings,
    planar: &Fix,
    z_offset: f64,
    limits: &SolverLimits,
) -> Result<Fix, ShotError> {
    if z_offset == 0.0 {
        return Ok(*planar);
    }

    let fix = locate(readings, z_offset, Some(planar.estimate), limits)?;
    debug!(
        "slant fix ({}, {}) from ({}, {}) in {} steps",
        fix.position.x, fix.position.y, planar.position.x, planar.position.y, fix.iterations
    );
    Ok(fix)
}
