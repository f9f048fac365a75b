// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Six ERCKS sensors on one shared clock line.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::config::CHANNEL_COUNT;
use crate::drivers::ercks::{Ercks, ReadError};
use crate::hw::spi::BitBangBus;
use crate::sensors::array::AngleSource;

/// Owns the shared bus and one driver per channel. Channel `i` is always `sensors[i]`.
pub struct SensorBank<CS, SDIO, SCK, DELAY> {
    bus: BitBangBus<SCK, DELAY>,
    sensors: [Ercks<CS, SDIO>; CHANNEL_COUNT],
}

impl<CS, SDIO, SCK, DELAY> SensorBank<CS, SDIO, SCK, DELAY>
where
    CS: OutputPin,
    SDIO: InputPin + OutputPin,
    SCK: OutputPin,
    DELAY: DelayUs<u32>,
{
    pub fn new(bus: BitBangBus<SCK, DELAY>, sensors: [Ercks<CS, SDIO>; CHANNEL_COUNT]) -> Self {
        Self { bus, sensors }
    }

    /// Attach every channel from its `(chip-select, data)` line pair.
    pub fn attach(bus: BitBangBus<SCK, DELAY>, lines: [(CS, SDIO); CHANNEL_COUNT]) -> Self {
        Self::new(bus, lines.map(|(cs, sdio)| Ercks::attach(cs, sdio)))
    }

    pub fn free(self) -> (BitBangBus<SCK, DELAY>, [Ercks<CS, SDIO>; CHANNEL_COUNT]) {
        (self.bus, self.sensors)
    }
}

impl<CS, SDIO, SCK, DELAY> AngleSource for SensorBank<CS, SDIO, SCK, DELAY>
where
    CS: OutputPin,
    SDIO: InputPin + OutputPin,
    SCK: OutputPin,
    DELAY: DelayUs<u32>,
{
    fn read_angle(&mut self, channel: usize) -> Result<u16, ReadError> {
        self.sensors[channel].read_angle(&mut self.bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ercks::sim::{self, Clock, Cs, Sdio};
    use crate::hw::testing::NoDelay;

    #[test]
    fn channels_map_to_their_own_lines() {
        let devs: [sim::Handle; CHANNEL_COUNT] =
            core::array::from_fn(|i| sim::device(sim::word(100 * (i as u16 + 1), false)));
        devs[4].borrow_mut().response = sim::word(9, true);

        let bus = BitBangBus::new(Clock::new(&devs), NoDelay, 1);
        let lines = core::array::from_fn(|i| (Cs(devs[i].clone()), Sdio(devs[i].clone())));
        let mut bank = SensorBank::attach(bus, lines);

        assert_eq!(bank.read_angle(0), Ok(100));
        assert_eq!(bank.read_angle(3), Ok(400));
        assert_eq!(bank.read_angle(4), Err(ReadError::Device));
        assert_eq!(bank.read_angle(5), Ok(600));

        assert_eq!(devs[3].borrow().transactions, 1);
        assert_eq!(devs[1].borrow().transactions, 0);
    }
}
