// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Delta6 Sensor Board Firmware
//!
//! This crate contains the firmware for the Delta6 joint sensor board, written in Rust, targeting
//! an STM32F777 MCU. The board reads six ERCKS rotary position sensors over bit-banged buses,
//! applies per-channel calibration offsets, and serves the positions to a host over a small framed
//! serial protocol.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Bit-banged bus primitives; MCU-level wrappers (USART, flash, pins) with `board` |
//! | [`drivers`] | Device-level drivers (ERCKS) |
//! | [`sensors`] | The six channels: offsets, cached positions, error flags |
//! | [`protocol`] | Host command frames and read replies |
//! | [`storage`] | Calibration persistence (flash-backed EEPROM emulation) |
//! | [`app`] | The control loop: command dispatch and background sampling |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run-board
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod log;

pub mod app;
pub mod config;
pub mod drivers;
pub mod hw;
pub mod protocol;
pub mod sensors;
pub mod storage;

pub use app::App;
