// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # freETarget Firmware
//!
//! This crate contains the firmware for an acoustic electronic target, written in Rust, targeting
//! an STM32F777 MCU. Four microphones around the target face latch the arrival of a projectile's
//! shock wave; the geometry engine turns those timer counts into an impact position.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Target dimensions, clock, environment and face alignment |
//! | [`geometry`] | Sensor calibration table and quadrant rotation |
//! | [`timing`] | Capture snapshots and timer normalization |
//! | [`solver`] | Multilateration and slant-range correction |
//! | [`shot`] | Shot records and score estimation |
//! | [`report`] | Score / miss / timer reporting sinks |
//! | [`pipeline`] | One shot from capture to outcome |
//! | `hw` | MCU-level wrappers (USART console, TIM2 capture, LEDs), `firmware` feature only |
//!
//! ## Getting Started
//!
//! Run the geometry tests on the host:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features firmware
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod report;
pub mod shot;
pub mod solver;
pub mod timing;

#[cfg(feature = "firmware")]
pub mod hw;

pub use config::TargetConfig;
pub use error::ShotError;
pub use pipeline::{ShotOutcome, Target};
