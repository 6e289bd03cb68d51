// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers for the target controller board.

pub mod capture;
pub mod led;
pub mod pins;
pub mod usart;

pub use capture::ShotCapture;
pub use led::{Led, StatusLeds};
pub use pins::BoardPins;
pub use usart::{ConsoleWriter, Usart};
