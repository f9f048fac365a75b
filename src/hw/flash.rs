// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Calibration flash sector using direct PAC register access.
//!
//! Sector 11 (the last 256 KiB of the 2 MiB single-bank flash) is reserved in `memory.x` and
//! backs the calibration journal. Programming uses 8-bit parallelism, which is valid over the
//! whole supply range.
//!
//! Flash reads stall while an erase or program is in progress, so every operation here blocks the
//! main loop until it completes. A sector erase takes on the order of a second.

use core::ptr;

use stm32f7xx_hal::pac;

use crate::storage::FlashSector;

/// Sector number in FLASH_CR.SNB.
const SECTOR: u32 = 11;
/// Start of sector 11.
const BASE: usize = 0x081C_0000;
/// Length of sector 11.
const SIZE: usize = 256 * 1024;

// FLASH_KEYR unlock sequence
const KEY1: u32 = 0x4567_0123;
const KEY2: u32 = 0xCDEF_89AB;

// FLASH_CR bits
mod cr {
    pub const PG: u32 = 1 << 0;
    pub const SER: u32 = 1 << 1;
    pub const SNB_SHIFT: u32 = 3;
    pub const SNB_MASK: u32 = 0x1F << SNB_SHIFT;
    pub const PSIZE_MASK: u32 = 0b11 << 8;
    pub const STRT: u32 = 1 << 16;
    pub const LOCK: u32 = 1 << 31;
}

// FLASH_SR bits
mod sr {
    pub const EOP: u32 = 1 << 0;
    pub const OPERR: u32 = 1 << 1;
    pub const WRPERR: u32 = 1 << 4;
    pub const PGAERR: u32 = 1 << 5;
    pub const PGPERR: u32 = 1 << 6;
    pub const ERSERR: u32 = 1 << 7;
    pub const BSY: u32 = 1 << 16;
    pub const ERRORS: u32 = OPERR | WRPERR | PGAERR | PGPERR | ERSERR;
}

/// Flash controller error, decoded from FLASH_SR.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The unlock sequence did not clear FLASH_CR.LOCK.
    Locked,
    WriteProtected,
    Alignment,
    Parallelism,
    EraseSequence,
    Operation,
    /// Access past the end of the sector.
    OutOfRange,
}

pub struct Sector {
    flash: pac::FLASH,
}

impl Sector {
    pub fn new(flash: pac::FLASH) -> Self {
        Self { flash }
    }

    pub fn free(self) -> pac::FLASH {
        self.flash
    }

    fn unlock(&mut self) -> Result<(), Error> {
        if self.flash.cr.read().bits() & cr::LOCK != 0 {
            self.flash.keyr.write(|w| unsafe { w.bits(KEY1) });
            self.flash.keyr.write(|w| unsafe { w.bits(KEY2) });
        }
        if self.flash.cr.read().bits() & cr::LOCK != 0 {
            return Err(Error::Locked);
        }
        Ok(())
    }

    fn lock(&mut self) {
        self.flash
            .cr
            .modify(|r, w| unsafe { w.bits((r.bits() & !(cr::PG | cr::SER)) | cr::LOCK) });
    }

    /// Wait for BSY to clear and decode any error flags.
    fn wait(&mut self) -> Result<(), Error> {
        while self.flash.sr.read().bits() & sr::BSY != 0 {}

        let status = self.flash.sr.read().bits();
        // Flags are cleared by writing 1.
        self.flash
            .sr
            .write(|w| unsafe { w.bits(status & (sr::ERRORS | sr::EOP)) });

        if status & sr::WRPERR != 0 {
            Err(Error::WriteProtected)
        } else if status & sr::PGAERR != 0 {
            Err(Error::Alignment)
        } else if status & sr::PGPERR != 0 {
            Err(Error::Parallelism)
        } else if status & sr::ERSERR != 0 {
            Err(Error::EraseSequence)
        } else if status & sr::OPERR != 0 {
            Err(Error::Operation)
        } else {
            Ok(())
        }
    }

    /// Run `op` with the controller unlocked, relocking afterwards on every path.
    fn unlocked<F>(&mut self, op: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.wait()?;
        self.unlock()?;
        let result = op(self);
        self.lock();
        result
    }
}

impl FlashSector for Sector {
    type Error = Error;

    fn size(&self) -> usize {
        SIZE
    }

    fn read(&self, offset: usize, buf: &mut [u8]) {
        for (i, b) in buf.iter_mut().enumerate() {
            let addr = BASE + offset + i;
            *b = unsafe { ptr::read_volatile(addr as *const u8) };
        }
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), Error> {
        if offset + data.len() > SIZE {
            return Err(Error::OutOfRange);
        }

        self.unlocked(|s| {
            // PSIZE = x8, PG = 1
            s.flash
                .cr
                .modify(|r, w| unsafe { w.bits((r.bits() & !cr::PSIZE_MASK) | cr::PG) });

            for (i, &b) in data.iter().enumerate() {
                let addr = BASE + offset + i;
                unsafe { ptr::write_volatile(addr as *mut u8, b) };
                cortex_m::asm::dsb();
                s.wait()?;
            }
            Ok(())
        })
    }

    fn erase(&mut self) -> Result<(), Error> {
        self.unlocked(|s| {
            s.flash.cr.modify(|r, w| unsafe {
                let bits = r.bits() & !(cr::PSIZE_MASK | cr::SNB_MASK | cr::PG);
                w.bits(bits | cr::SER | (SECTOR << cr::SNB_SHIFT))
            });
            s.flash
                .cr
                .modify(|r, w| unsafe { w.bits(r.bits() | cr::STRT) });
            cortex_m::asm::dsb();
            s.wait()
        })
    }
}
