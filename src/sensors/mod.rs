// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Sensor Channels
//!
//! - [`bank`] - The six ERCKS sensors and their shared clock, read by channel index.
//! - [`array`] - Per-channel calibration offsets, cached positions and error flags.

pub mod array;
pub mod bank;

pub use array::{AngleSource, Calibration, Channel, ErrorFlags, SensorArray};
pub use bank::SensorBank;
