// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bit-banged serial bus with a shared clock and per-device data lines.
//!
//! - `BitBangBus` owns the shared SCK line and the delay used for bit timing.
//! - `ChipSelect` is an active-low GPIO output wrapper for manual CS control.
//!
//! Each device has its own bidirectional data line (SDIO). The line is expected to be open-drain
//! with a pull-up, so "driving high" and "released" are the same electrical state and the device
//! can pull it low while the master reads.
//!
//! Timing (SCK idles low, one rising and one falling edge per bit):
//! - Master -> device: data is set up while SCK is low and latched by the device on the rising
//!   edge.
//! - Device -> master: the device shifts a bit out on the rising edge and the master samples it
//!   while SCK is high, before the falling edge.
//!
//! The bus is not owned by any device. Drivers take it as `&mut BitBangBus` so that all sensors
//! can share the one clock line.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Bus-level failure. Pin errors from the HAL are collapsed to the line that failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The shared clock line could not be driven.
    Clock,
    /// A data line could not be driven or sampled.
    Data,
    /// A chip-select line could not be driven.
    ChipSelect,
}

/// Shared-clock bit-banged bus.
pub struct BitBangBus<SCK, DELAY> {
    sck: SCK,
    delay: DELAY,
    half_period_us: u32,
}

impl<SCK, DELAY> BitBangBus<SCK, DELAY>
where
    SCK: OutputPin,
    DELAY: DelayUs<u32>,
{
    /// Take ownership of the clock line and park it in the idle (low) state.
    pub fn new(mut sck: SCK, delay: DELAY, half_period_us: u32) -> Self {
        sck.set_low().ok();
        Self {
            sck,
            delay,
            half_period_us,
        }
    }

    /// Wait one half clock period.
    #[inline]
    pub fn settle(&mut self) {
        self.delay.delay_us(self.half_period_us);
    }

    #[inline]
    fn rise(&mut self) -> Result<(), Error> {
        self.sck.set_high().map_err(|_| Error::Clock)?;
        self.settle();
        Ok(())
    }

    #[inline]
    fn fall(&mut self) -> Result<(), Error> {
        self.sck.set_low().map_err(|_| Error::Clock)?;
        self.settle();
        Ok(())
    }

    /// Shift one byte out on `sdio`, MSB first.
    pub fn write_byte<SDIO: OutputPin>(&mut self, sdio: &mut SDIO, byte: u8) -> Result<(), Error> {
        for bit in (0..8).rev() {
            if (byte >> bit) & 1 != 0 {
                sdio.set_high().map_err(|_| Error::Data)?;
            } else {
                sdio.set_low().map_err(|_| Error::Data)?;
            }
            self.settle();
            self.rise()?;
            self.sck.set_low().map_err(|_| Error::Clock)?;
        }
        Ok(())
    }

    /// Release `sdio` and clock in `bits` bits, MSB first.
    pub fn read_bits<SDIO>(&mut self, sdio: &mut SDIO, bits: u8) -> Result<u32, Error>
    where
        SDIO: InputPin + OutputPin,
    {
        // Turnaround: let the device take the line.
        sdio.set_high().map_err(|_| Error::Data)?;
        self.settle();

        let mut word: u32 = 0;
        for _ in 0..bits {
            self.rise()?;
            let high = sdio.is_high().map_err(|_| Error::Data)?;
            word = (word << 1) | high as u32;
            self.fall()?;
        }
        Ok(word)
    }

    /// Release the clock line and delay.
    pub fn free(self) -> (SCK, DELAY) {
        (self.sck, self.delay)
    }
}

/// Manual chip-select line, active-low, generic over any output pin.
pub struct ChipSelect<PIN> {
    pin: PIN,
}

impl<PIN: OutputPin> ChipSelect<PIN> {
    /// Create an active-low chip select and set to the inactive state (i.e., high).
    pub fn active_low(mut pin: PIN) -> Self {
        pin.set_high().ok();
        Self { pin }
    }

    /// Assert the chip select.
    #[inline]
    pub fn select(&mut self) -> Result<(), Error> {
        self.pin.set_low().map_err(|_| Error::ChipSelect)
    }

    /// Deassert the chip select.
    #[inline]
    pub fn deselect(&mut self) -> Result<(), Error> {
        self.pin.set_high().map_err(|_| Error::ChipSelect)
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::testing::{Line, NoDelay};

    #[test]
    fn clock_idles_low_and_pulses_once_per_bit() {
        let sck = Line::new(true);
        let mut sdio = Line::new(true);
        let mut bus = BitBangBus::new(sck.clone(), NoDelay, 1);
        assert!(!sck.level());

        bus.write_byte(&mut sdio, 0xA5).unwrap();
        assert_eq!(sck.rising_edges(), 8);
        assert!(!sck.level());

        bus.read_bits(&mut sdio, 16).unwrap();
        assert_eq!(sck.rising_edges(), 24);
        assert!(!sck.level());
    }

    #[test]
    fn write_leaves_last_bit_on_the_line() {
        let sck = Line::new(false);
        let mut sdio = Line::new(true);
        let mut bus = BitBangBus::new(sck, NoDelay, 1);

        bus.write_byte(&mut sdio, 0b0000_0001).unwrap();
        assert!(sdio.level());
        bus.write_byte(&mut sdio, 0b1111_1110).unwrap();
        assert!(!sdio.level());
    }

    #[test]
    fn read_of_released_line_is_all_ones() {
        let mut sdio = Line::new(false);
        let mut bus = BitBangBus::new(Line::new(false), NoDelay, 1);

        assert_eq!(bus.read_bits(&mut sdio, 16).unwrap(), 0xFFFF);
    }

    #[test]
    fn chip_select_starts_inactive() {
        let pin = Line::new(false);
        let mut cs = ChipSelect::active_low(pin.clone());
        assert!(pin.level());

        cs.select().unwrap();
        assert!(!pin.level());
        cs.deselect().unwrap();
        assert!(pin.level());
    }
}
