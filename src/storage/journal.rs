// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! EEPROM emulation on one erasable flash sector.
//!
//! Every byte write appends a 4-byte record to the sector:
//!
//! ```text
//! [TAG][addr][value][!(addr ^ value)]
//! ```
//!
//! A RAM image holds the current contents and is rebuilt at mount time by replaying all valid
//! records in order, so the last record for an address wins. Records that fail their check (e.g.
//! half-programmed on power loss) are skipped. When the sector is full, it is erased and the live
//! image is written back as fresh records.
//!
//! The image only takes a new value once its record is in flash. If a compaction fails after the
//! erase, the sector no longer matches the image; the next write redoes the compaction before
//! anything else.
//!
//! Flash sectors on the STM32F7 are large (up to 256 KiB) and slow to erase, so appending keeps
//! erases rare: one per ~64k byte writes on the calibration sector.

use core::fmt;

use crate::storage::eeprom::{check_range, Eeprom};

const TAG: u8 = 0x5A;
const RECORD_LEN: usize = 4;
const ERASED: u8 = 0xFF;

/// One erasable NOR flash sector, addressed from its start.
pub trait FlashSector {
    type Error: fmt::Debug;

    /// Sector length in bytes.
    fn size(&self) -> usize;

    fn read(&self, offset: usize, buf: &mut [u8]);

    /// Program erased bytes. Bits can only go from 1 to 0.
    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;

    /// Erase the whole sector back to `0xFF`.
    fn erase(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalError<E> {
    OutOfRange,
    Flash(E),
}

#[inline]
fn check(addr: u8, value: u8) -> u8 {
    !(addr ^ value)
}

/// Byte-addressable store of `N` bytes journaled onto `F`.
pub struct Journal<F, const N: usize> {
    flash: F,
    image: [u8; N],
    head: usize,
    compactions: u32,
    /// The sector was erased but not fully rewritten.
    stale: bool,
}

impl<F: FlashSector, const N: usize> Journal<F, N> {
    /// Replay the sector into RAM.
    pub fn mount(flash: F) -> Self {
        debug_assert!(N <= 256, "record addresses are one byte");
        debug_assert!(N * RECORD_LEN <= flash.size(), "image must fit in one sector");

        let mut image = [ERASED; N];
        let size = flash.size();
        let mut head = size - size % RECORD_LEN;
        let mut rec = [0u8; RECORD_LEN];

        let mut offset = 0;
        while offset + RECORD_LEN <= size {
            flash.read(offset, &mut rec);
            if rec == [ERASED; RECORD_LEN] {
                head = offset;
                break;
            }
            let [tag, addr, value, chk] = rec;
            if tag == TAG && chk == check(addr, value) && (addr as usize) < N {
                image[addr as usize] = value;
            }
            offset += RECORD_LEN;
        }

        Self {
            flash,
            image,
            head,
            compactions: 0,
            stale: false,
        }
    }

    /// Byte offset of the next free record.
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Number of erase-and-rewrite cycles since mount.
    #[inline]
    pub fn compactions(&self) -> u32 {
        self.compactions
    }

    pub fn free(self) -> F {
        self.flash
    }

    fn append(&mut self, addr: u8, value: u8) -> Result<(), F::Error> {
        let rec = [TAG, addr, value, check(addr, value)];
        let result = self.flash.program(self.head, &rec);
        // A failed program may still have touched the slot; never reuse it unless it is blank.
        if result.is_ok() || !self.slot_erased(self.head) {
            self.head += RECORD_LEN;
        }
        result
    }

    fn slot_erased(&self, offset: usize) -> bool {
        let mut rec = [0u8; RECORD_LEN];
        self.flash.read(offset, &mut rec);
        rec == [ERASED; RECORD_LEN]
    }

    /// Erase the sector and write back every non-erased byte of the image, with `pending`
    /// applied on top.
    fn compact(&mut self, pending: Option<(usize, u8)>) -> Result<(), F::Error> {
        self.stale = true;
        self.flash.erase()?;
        self.head = 0;
        self.compactions = self.compactions.wrapping_add(1);
        for addr in 0..N {
            let value = match pending {
                Some((at, value)) if at == addr => value,
                _ => self.image[addr],
            };
            if value != ERASED {
                self.append(addr as u8, value)?;
            }
        }
        self.stale = false;
        Ok(())
    }
}

impl<F: FlashSector, const N: usize> Eeprom for Journal<F, N> {
    type Error = JournalError<F::Error>;

    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        check_range(offset, buf.len(), N).map_err(|_| JournalError::OutOfRange)?;
        buf.copy_from_slice(&self.image[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        check_range(offset, data.len(), N).map_err(|_| JournalError::OutOfRange)?;

        if self.stale {
            self.compact(None).map_err(JournalError::Flash)?;
        }

        for (i, &value) in data.iter().enumerate() {
            let addr = offset + i;
            if self.image[addr] == value {
                continue;
            }
            if self.head + RECORD_LEN > self.flash.size() {
                self.compact(Some((addr, value)))
            } else {
                self.append(addr as u8, value)
            }
            .map_err(JournalError::Flash)?;
            self.image[addr] = value;
        }
        Ok(())
    }
}
