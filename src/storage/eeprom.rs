// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-addressable non-volatile store.
//!
//! Writes are expected to be durable when `write` returns. Nothing is batched.

use core::fmt;

/// A byte-addressable store. Unwritten bytes read as `0xFF`.
pub trait Eeprom {
    type Error: fmt::Debug;

    /// Number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Fill `buf` from `offset`.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Store `data` at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;
}

/// Access beyond the end of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

#[inline]
pub(crate) fn check_range(offset: usize, len: usize, capacity: usize) -> Result<(), OutOfRange> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(OutOfRange),
    }
}

/// Volatile store held in RAM. Contents are lost on reset.
pub struct RamEeprom<const N: usize> {
    bytes: [u8; N],
    writes: u32,
}

impl<const N: usize> Default for RamEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamEeprom<N> {
    /// An erased store.
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: 0,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Number of successful `write` calls.
    #[inline]
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl<const N: usize> Eeprom for RamEeprom<N> {
    type Error = OutOfRange;

    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), OutOfRange> {
        check_range(offset, buf.len(), N)?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), OutOfRange> {
        check_range(offset, data.len(), N)?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}
