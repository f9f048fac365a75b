// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host command protocol.
//!
//! Command frame (host -> board), 3 bytes:
//!
//! ```text
//! [START_BYTE][cmd][checksum]        checksum = cmd
//! ```
//!
//! Only [`MSG_READ`] produces a reply; see [`crate::protocol::response`].

/// Sync byte for the protocol, in both directions.
pub const START_BYTE: u8 = 0xAA;

// Message IDs
pub const MSG_CALIBRATE: u8 = 0x01;
pub const MSG_READ: u8 = 0x02;

/// Host commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Take the current angles as the new zero offsets and persist them. No reply.
    Calibrate,
    /// Reply with calibrated positions and accumulated error flags.
    Read,
}

impl Command {
    /// Decode a message ID. Unknown IDs yield `None`.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            MSG_CALIBRATE => Some(Command::Calibrate),
            MSG_READ => Some(Command::Read),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Command::Calibrate => MSG_CALIBRATE,
            Command::Read => MSG_READ,
        }
    }

    /// Encode the 3-byte command frame (host side).
    pub fn frame(self) -> [u8; 3] {
        let id = self.id();
        [START_BYTE, id, checksum(&[id])]
    }
}

/// Modulo-256 sum of `bytes`.
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x02]), 0x02);
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
    }

    #[test]
    fn command_frames() {
        assert_eq!(Command::Calibrate.frame(), [0xAA, 0x01, 0x01]);
        assert_eq!(Command::Read.frame(), [0xAA, 0x02, 0x02]);
        assert_eq!(Command::from_id(0x03), None);
    }
}
