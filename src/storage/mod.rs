// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Non-Volatile Storage
//!
//! - [`eeprom`] - Byte-addressable store trait and a RAM-backed implementation.
//! - [`journal`] - EEPROM emulation on top of one erasable flash sector.
//! - [`calibration`] - Calibration offset table (one `i16` slot per channel).

pub mod calibration;
pub mod eeprom;
pub mod journal;

pub use calibration::CalibrationStore;
pub use eeprom::{Eeprom, OutOfRange, RamEeprom};
pub use journal::{FlashSector, Journal, JournalError};
