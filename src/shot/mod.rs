// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Shot Records
//!
//! ## Modules
//!
//! - [`record`] - Hit and miss records built from a finished solve.
//! - [`score`] - Target faces and decimal score estimation.

pub mod record;
pub mod score;

pub use record::{build_hit, build_miss, Correction, MissRecord, ShotRecord};
pub use score::{TargetFace, NRA_B38};
