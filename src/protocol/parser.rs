// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Incremental parser for host command frames.
//!
//! Bytes are fed in one at a time as they arrive. State is kept between calls, so a frame may be
//! split across any number of reads. There is no timeout: a partial frame waits indefinitely for
//! its continuation.

use crate::protocol::messages::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitStart,
    ReadCommand,
    ReadChecksum { id: u8 },
}

pub struct Parser {
    state: State,
    rejected: u32,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub const fn new() -> Self {
        Self {
            state: State::WaitStart,
            rejected: 0,
        }
    }

    /// Process a single incoming byte. Returns `Some(Command)` once a complete frame with a valid
    /// checksum and a known message ID has been received.
    ///
    /// Frames with a bad checksum or an unknown ID are dropped silently.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        match self.state {
            State::WaitStart => {
                if byte == START_BYTE {
                    self.state = State::ReadCommand;
                }
            }
            State::ReadCommand => {
                // The ID is not checked until the checksum has arrived.
                self.state = State::ReadChecksum { id: byte };
            }
            State::ReadChecksum { id } => {
                self.state = State::WaitStart;

                let command = if byte == checksum(&[id]) {
                    Command::from_id(id)
                } else {
                    None
                };
                if command.is_none() {
                    self.rejected = self.rejected.wrapping_add(1);
                }
                return command;
            }
        }
        None
    }

    /// Feed a slice, invoking `on_command` for every command found.
    pub fn push_all<F: FnMut(Command)>(&mut self, bytes: &[u8], mut on_command: F) {
        for &b in bytes {
            if let Some(cmd) = self.push(b) {
                on_command(cmd);
            }
        }
    }

    /// Frames dropped so far (bad checksum or unknown ID). Wraps.
    #[inline]
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// True while a frame is partially received.
    #[inline]
    pub fn in_frame(&self) -> bool {
        self.state != State::WaitStart
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.state = State::WaitStart;
    }
}
