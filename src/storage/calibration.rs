// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Persistent calibration offsets.
//!
//! Channel `i` owns two bytes at `CALIBRATION_BASE + 2 * i`, little-endian `i16`. The table is read
//! once at startup and written one slot at a time, only when a channel calibrates successfully.

use crate::config::{CALIBRATION_BASE, CHANNEL_COUNT};
use crate::storage::eeprom::Eeprom;

const SLOT_LEN: usize = core::mem::size_of::<i16>();

/// Slot contents of a never-written (erased) store.
const ERASED_SLOT: [u8; SLOT_LEN] = [0xFF; SLOT_LEN];

pub struct CalibrationStore<E> {
    eeprom: E,
}

impl<E: Eeprom> CalibrationStore<E> {
    pub fn new(eeprom: E) -> Self {
        Self { eeprom }
    }

    /// Byte offset of a channel's slot.
    #[inline]
    pub const fn slot_offset(channel: usize) -> usize {
        CALIBRATION_BASE + channel * SLOT_LEN
    }

    /// Read one channel's stored offset. An erased slot reads as 0.
    ///
    /// Taken literally, an erased `0xFFFF` slot is the `i16` value -1, which a plain byte copy
    /// would hand back on a blank device. Here it is mapped to 0 instead, so a never-calibrated
    /// board reports raw angles. Stored offsets are raw angles and never negative, so the erased
    /// pattern cannot collide with a real value.
    pub fn get(&mut self, channel: usize) -> Result<i16, E::Error> {
        let mut raw = [0u8; SLOT_LEN];
        self.eeprom.read(Self::slot_offset(channel), &mut raw)?;
        if raw == ERASED_SLOT {
            return Ok(0);
        }
        Ok(i16::from_le_bytes(raw))
    }

    /// Write one channel's offset immediately.
    pub fn put(&mut self, channel: usize, value: i16) -> Result<(), E::Error> {
        self.eeprom
            .write(Self::slot_offset(channel), &value.to_le_bytes())
    }

    /// Read the whole table.
    pub fn load_all(&mut self) -> Result<[i16; CHANNEL_COUNT], E::Error> {
        let mut offsets = [0i16; CHANNEL_COUNT];
        for (ch, slot) in offsets.iter_mut().enumerate() {
            *slot = self.get(ch)?;
        }
        Ok(offsets)
    }

    #[inline]
    pub fn eeprom(&self) -> &E {
        &self.eeprom
    }

    pub fn free(self) -> E {
        self.eeprom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::eeprom::RamEeprom;

    #[test]
    fn erased_store_loads_zero_offsets() {
        let mut store = CalibrationStore::new(RamEeprom::<16>::new());
        assert_eq!(store.load_all().unwrap(), [0; CHANNEL_COUNT]);
    }

    #[test]
    fn slots_are_consecutive_little_endian() {
        let mut store = CalibrationStore::new(RamEeprom::<16>::new());
        store.put(0, 0x1234).unwrap();
        store.put(5, 16383).unwrap();

        let bytes = store.eeprom().as_bytes();
        assert_eq!(&bytes[0..2], &[0x34, 0x12]);
        assert_eq!(&bytes[10..12], &[0xFF, 0x3F]);
        assert_eq!(&bytes[2..4], &[0xFF, 0xFF]);

        assert_eq!(store.load_all().unwrap(), [0x1234, 0, 0, 0, 0, 16383]);
    }

    #[test]
    fn store_too_small_errors() {
        let mut store = CalibrationStore::new(RamEeprom::<4>::new());
        assert!(store.put(5, 1).is_err());
        assert!(store.load_all().is_err());
    }
}
