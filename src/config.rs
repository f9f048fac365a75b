// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration for the sensor board.

use crate::log::Level;

/// Number of rotary sensor channels on the board.
pub const CHANNEL_COUNT: usize = 6;

/// Host link baud rate (USART2).
pub const HOST_BAUD: u32 = 115_200;

/// Debug console baud rate (USART1).
pub const DEBUG_BAUD: u32 = 115_200;

/// Idle time at the end of every control loop tick.
pub const LOOP_PERIOD_MS: u32 = 10;

/// Loop ticks between heartbeat LED toggles (~1 Hz blink).
pub const HEARTBEAT_TICKS: u32 = 50;

/// Half of one bit-banged clock period.
///
/// 24 clock pulses per transaction puts one sensor read at ~100 µs.
pub const BUS_HALF_PERIOD_US: u32 = 2;

/// First EEPROM byte of the calibration table (six little-endian `i16` slots).
pub const CALIBRATION_BASE: usize = 0;

/// Size of the emulated EEPROM image kept in RAM.
pub const EEPROM_SIZE: usize = 64;

/// Lowest level that reaches the debug console.
pub const LOG_LEVEL: Level = Level::Info;
