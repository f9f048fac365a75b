// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Reply to a read command.
//!
//! ```text
//! [START_BYTE][p0_hi][p0_lo] ... [p5_hi][p5_lo][errors][checksum]
//! ```
//!
//! Positions are calibrated angles as big-endian two's-complement `i16`. `errors` has bit `i` set
//! if channel `i` failed a read since the previous reply. The checksum is the modulo-256 sum of
//! the 13 bytes between the start byte and the checksum.

use crate::config::CHANNEL_COUNT;
use crate::protocol::messages::{checksum, START_BYTE};

/// Total frame length in bytes.
pub const RESPONSE_LEN: usize = 1 + 2 * CHANNEL_COUNT + 1 + 1;

const ERRORS_AT: usize = 1 + 2 * CHANNEL_COUNT;
const CHECKSUM_AT: usize = ERRORS_AT + 1;

/// An encoded reply, ready to be written to the host link in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame {
    bytes: [u8; RESPONSE_LEN],
}

/// Decoded contents of a reply (host side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub positions: [i16; CHANNEL_COUNT],
    pub errors: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    StartByte,
    Checksum { expected: u8, received: u8 },
}

impl ResponseFrame {
    pub fn new(positions: &[i16; CHANNEL_COUNT], errors: u8) -> Self {
        let mut bytes = [0u8; RESPONSE_LEN];
        bytes[0] = START_BYTE;
        for (i, p) in positions.iter().enumerate() {
            bytes[1 + 2 * i..3 + 2 * i].copy_from_slice(&p.to_be_bytes());
        }
        bytes[ERRORS_AT] = errors;
        bytes[CHECKSUM_AT] = checksum(&bytes[1..CHECKSUM_AT]);
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; RESPONSE_LEN] {
        &self.bytes
    }

    #[inline]
    pub fn checksum(&self) -> u8 {
        self.bytes[CHECKSUM_AT]
    }

    /// Validate and unpack a received reply.
    pub fn decode(bytes: &[u8; RESPONSE_LEN]) -> Result<Report, DecodeError> {
        if bytes[0] != START_BYTE {
            return Err(DecodeError::StartByte);
        }
        let expected = checksum(&bytes[1..CHECKSUM_AT]);
        let received = bytes[CHECKSUM_AT];
        if expected != received {
            return Err(DecodeError::Checksum { expected, received });
        }

        let mut positions = [0i16; CHANNEL_COUNT];
        for (i, p) in positions.iter_mut().enumerate() {
            *p = i16::from_be_bytes([bytes[1 + 2 * i], bytes[2 + 2 * i]]);
        }
        Ok(Report {
            positions,
            errors: bytes[ERRORS_AT],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_wire_format() {
        let frame = ResponseFrame::new(&[9, 18, 27, 36, 45, 54], 0);
        let b = frame.as_bytes();

        assert_eq!(b.len(), 15);
        assert_eq!(b[0], 0xAA);
        assert_eq!(&b[1..13], &[0, 9, 0, 18, 0, 27, 0, 36, 0, 45, 0, 54]);
        assert_eq!(b[13], 0);
        assert_eq!(b[14], 189);
        assert_eq!(frame.checksum(), 189);
    }

    #[test]
    fn negative_positions_are_twos_complement() {
        let frame = ResponseFrame::new(&[-1, -300, 0, 0, 0, 0], 0b10_0001);
        let b = frame.as_bytes();

        assert_eq!(&b[1..5], &[0xFF, 0xFF, 0xFE, 0xD4]);
        assert_eq!(b[13], 0x21);
        assert_eq!(
            b[14],
            (0xFFu32 + 0xFF + 0xFE + 0xD4 + 0x21) as u8,
        );
    }

    #[test]
    fn decode_checks_start_and_checksum() {
        let frame = ResponseFrame::new(&[1, -2, 3, -4, 5, -6], 0x08);
        let report = ResponseFrame::decode(frame.as_bytes()).unwrap();
        assert_eq!(report.positions, [1, -2, 3, -4, 5, -6]);
        assert_eq!(report.errors, 0x08);

        let mut corrupt = *frame.as_bytes();
        corrupt[4] ^= 0x10;
        assert!(matches!(
            ResponseFrame::decode(&corrupt),
            Err(DecodeError::Checksum { .. })
        ));

        let mut unsynced = *frame.as_bytes();
        unsynced[0] = 0x55;
        assert_eq!(ResponseFrame::decode(&unsynced), Err(DecodeError::StartByte));
    }
}
