// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debug console logging.
//!
//! The `log_*!` macros write one CRLF-terminated, level-tagged line to any [`core::fmt::Write`]
//! sink. On the board that sink is the USART1 debug console; in tests it is a `String`.
//!
//! ```ignore
//! log_info!(console, "ch{} offset = {}", ch, offset);
//! ```
//!
//! Formatting errors are dropped.

use core::fmt;

use crate::config;

/// Log severity, lowest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

impl Level {
    #[inline]
    pub const fn tag(self) -> &'static str {
        match self {
            Level::Debug => "[DEBUG] ",
            Level::Info => "[INFO] ",
            Level::Warn => "[WARN] ",
        }
    }

    /// Whether this level passes [`config::LOG_LEVEL`].
    #[inline]
    pub const fn enabled(self) -> bool {
        self as u8 >= config::LOG_LEVEL as u8
    }
}

/// Write a single log line. Prefer the `log_*!` macros.
pub fn write_line<W: fmt::Write + ?Sized>(out: &mut W, level: Level, args: fmt::Arguments<'_>) {
    let _ = out.write_str(level.tag());
    let _ = out.write_fmt(args);
    let _ = out.write_str("\r\n");
}

#[macro_export]
macro_rules! log_debug {
    ($out:expr, $($arg:tt)+) => {
        if $crate::log::Level::Debug.enabled() {
            $crate::log::write_line(&mut $out, $crate::log::Level::Debug, format_args!($($arg)+));
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($out:expr, $($arg:tt)+) => {
        if $crate::log::Level::Info.enabled() {
            $crate::log::write_line(&mut $out, $crate::log::Level::Info, format_args!($($arg)+));
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($out:expr, $($arg:tt)+) => {
        if $crate::log::Level::Warn.enabled() {
            $crate::log::write_line(&mut $out, $crate::log::Level::Warn, format_args!($($arg)+));
        }
    };
}
