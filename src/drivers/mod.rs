// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic.
//!
//! ## Existing drivers
//!
//! - [`ercks`] – ERCKS rotary position sensor on a bit-banged shared-clock bus

pub mod ercks;

pub use ercks::{Ercks, ReadError, ANGLE_MAX};
