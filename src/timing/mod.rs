// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Arrival Timing
//!
//! Everything between the capture hardware and the solver.
//!
//! ## Modules
//!
//! - [`status`] - Typed per-sensor validity set.
//! - [`latch`] - Arrival stamps held until a shot closes.
//! - [`normalize`] - Capture snapshots and the per-shot sensor readings built from them.

pub mod latch;
pub mod normalize;
pub mod status;

pub use latch::ArrivalLatch;
pub use normalize::{normalize, Capture, RawTimers, Readings, SensorReading, MIN_SENSORS};
pub use status::SensorStatus;
