// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ERCKS rotary position sensor on a bit-banged, single-data-line bus.
//!
//! One transaction:
//! 1. assert CS,
//! 2. shift out the 8-bit `READ_ANGLE` opcode,
//! 3. release the data line and clock in a 16-bit response word,
//! 4. deassert CS.
//!
//! Response word layout:
//!
//! | Bit   | Meaning |
//! | ----- | ------- |
//! | 15    | Even parity over the whole word |
//! | 14    | Error / not-ready flag |
//! | 13..0 | Angle, `0..=ANGLE_MAX` |
//!
//! The clock line is shared between all sensors and is passed in as `&mut BitBangBus`.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::hw::spi::{self, BitBangBus, ChipSelect};

/// Opcode that requests the current angle.
pub const READ_ANGLE: u8 = 0x55;

/// Largest angle the sensor reports (14-bit resolution).
pub const ANGLE_MAX: u16 = 0x3FFF;

const RESPONSE_BITS: u8 = 16;

/// Raw 16-bit response word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reading {
    raw: u16,
}

impl Reading {
    #[inline]
    pub fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// Even parity holds over all 16 bits.
    #[inline]
    pub fn parity_ok(&self) -> bool {
        self.raw.count_ones() % 2 == 0
    }

    /// Device reported an error or was not ready.
    #[inline]
    pub fn error(&self) -> bool {
        (self.raw & (1 << 14)) != 0
    }

    #[inline]
    pub fn angle(&self) -> u16 {
        self.raw & ANGLE_MAX
    }
}

/// Why a single angle read failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadError {
    /// A bus line could not be driven or sampled.
    Bus(spi::Error),
    /// The response word failed its parity check.
    Parity,
    /// The sensor flagged an error in-band.
    Device,
}

impl From<spi::Error> for ReadError {
    fn from(e: spi::Error) -> Self {
        ReadError::Bus(e)
    }
}

/// One ERCKS sensor: its chip select and its own data line.
pub struct Ercks<CS, SDIO> {
    cs: ChipSelect<CS>,
    sdio: SDIO,
}

impl<CS, SDIO> Ercks<CS, SDIO>
where
    CS: OutputPin,
    SDIO: InputPin + OutputPin,
{
    /// Bind the sensor's lines, leaving CS deasserted and the data line released.
    pub fn attach(cs: CS, mut sdio: SDIO) -> Self {
        let cs = ChipSelect::active_low(cs);
        sdio.set_high().ok();
        Self { cs, sdio }
    }

    /// Run one transaction and return the raw response word.
    ///
    /// CS is deasserted on every exit path.
    pub fn read_raw<SCK, DELAY>(
        &mut self,
        bus: &mut BitBangBus<SCK, DELAY>,
    ) -> Result<Reading, ReadError>
    where
        SCK: OutputPin,
        DELAY: DelayUs<u32>,
    {
        self.cs.select()?;
        bus.settle();

        let word = bus
            .write_byte(&mut self.sdio, READ_ANGLE)
            .and_then(|()| bus.read_bits(&mut self.sdio, RESPONSE_BITS));

        let deselected = self.cs.deselect();
        let word = word?;
        deselected?;

        Ok(Reading::new(word as u16))
    }

    /// Read the current angle in `0..=ANGLE_MAX`. No retries.
    pub fn read_angle<SCK, DELAY>(
        &mut self,
        bus: &mut BitBangBus<SCK, DELAY>,
    ) -> Result<u16, ReadError>
    where
        SCK: OutputPin,
        DELAY: DelayUs<u32>,
    {
        let reading = self.read_raw(bus)?;
        if !reading.parity_ok() {
            return Err(ReadError::Parity);
        }
        if reading.error() {
            return Err(ReadError::Device);
        }
        Ok(reading.angle())
    }

    /// Release the chip-select and data lines.
    pub fn free(self) -> (CS, SDIO) {
        (self.cs.free(), self.sdio)
    }
}

#[cfg(test)]
pub(crate) mod sim {
    //! A simulated sensor wired through fake pins.

    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use embedded_hal::digital::v2::{InputPin, OutputPin};

    use super::READ_ANGLE;

    /// Build a response word with correct parity.
    pub fn word(angle: u16, error: bool) -> u16 {
        let mut w = angle & super::ANGLE_MAX;
        if error {
            w |= 1 << 14;
        }
        if w.count_ones() % 2 != 0 {
            w |= 1 << 15;
        }
        w
    }

    pub struct Device {
        pub response: u16,
        pub opcodes: Vec<u8>,
        pub transactions: u32,
        selected: bool,
        master_level: bool,
        device_level: bool,
        bits_in: u8,
        opcode: u8,
        bits_out: u8,
    }

    impl Device {
        fn on_rise(&mut self) {
            if !self.selected {
                return;
            }
            if self.bits_in < 8 {
                self.opcode = (self.opcode << 1) | self.master_level as u8;
                self.bits_in += 1;
                if self.bits_in == 8 {
                    self.opcodes.push(self.opcode);
                }
            } else if self.opcode == READ_ANGLE && self.bits_out < 16 {
                self.device_level = (self.response >> (15 - self.bits_out)) & 1 != 0;
                self.bits_out += 1;
            }
        }
    }

    pub type Handle = Rc<RefCell<Device>>;

    pub fn device(response: u16) -> Handle {
        Rc::new(RefCell::new(Device {
            response,
            opcodes: Vec::new(),
            transactions: 0,
            selected: false,
            master_level: true,
            device_level: true,
            bits_in: 0,
            opcode: 0,
            bits_out: 0,
        }))
    }

    /// Shared clock; notifies every attached device on a rising edge.
    pub struct Clock {
        level: bool,
        devices: Vec<Handle>,
    }

    impl Clock {
        pub fn new(devices: &[Handle]) -> Self {
            Self {
                level: false,
                devices: devices.to_vec(),
            }
        }
    }

    impl OutputPin for Clock {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.level = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            if !self.level {
                for d in &self.devices {
                    d.borrow_mut().on_rise();
                }
            }
            self.level = true;
            Ok(())
        }
    }

    pub struct Cs(pub Handle);

    impl OutputPin for Cs {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            let mut d = self.0.borrow_mut();
            d.selected = true;
            d.bits_in = 0;
            d.bits_out = 0;
            d.opcode = 0;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let mut d = self.0.borrow_mut();
            if d.selected {
                d.transactions += 1;
            }
            d.selected = false;
            d.device_level = true;
            Ok(())
        }
    }

    /// Open-drain data line: reads back the wired-AND of master and device.
    pub struct Sdio(pub Handle);

    impl OutputPin for Sdio {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().master_level = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().master_level = true;
            Ok(())
        }
    }

    impl InputPin for Sdio {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Infallible> {
            let d = self.0.borrow();
            Ok(d.master_level && d.device_level)
        }

        fn is_low(&self) -> Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }
}
