// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 Delta6 sensor board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiod, gpioe, Alternate, ErasedPin, OpenDrain, Output, PushPull},
    pac,
    prelude::*,
};

use crate::config::CHANNEL_COUNT;

/// Chip-select line of one sensor.
pub type CsPin = ErasedPin<Output<PushPull>>;
/// Bidirectional data line of one sensor (open-drain, pulled up).
pub type SdioPin = ErasedPin<Output<OpenDrain>>;

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE, dp.GPIOF);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub usart2: Usart2Pins,
    pub sensors: SensorPins,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// USART1 TX/RX (debug console)
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// USART2 TX/RX (host link)
pub struct Usart2Pins {
    pub tx: gpiod::PD5<Alternate<7>>,
    pub rx: gpiod::PD6<Alternate<7>>,
}

/// Sensor bus: one shared clock, then `(CS, SDIO)` per channel in channel order.
///
/// | Channel | CS  | SDIO |
/// | ------- | --- | ---- |
/// | 0 | PE3 | PF0 |
/// | 1 | PE4 | PF1 |
/// | 2 | PE5 | PF2 |
/// | 3 | PE6 | PF3 |
/// | 4 | PE7 | PF4 |
/// | 5 | PE8 | PF5 |
pub struct SensorPins {
    pub sck: gpioe::PE2<Output<PushPull>>,
    pub lines: [(CsPin, SdioPin); CHANNEL_COUNT],
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiod: pac::GPIOD, gpioe: pac::GPIOE, gpiof: pac::GPIOF) -> Self {
        let gpioa = gpioa.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();
        let gpiof = gpiof.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            usart2: Usart2Pins {
                tx: gpiod.pd5.into_alternate::<7>(),
                rx: gpiod.pd6.into_alternate::<7>().internal_pull_up(true),
            },

            sensors: SensorPins {
                sck: gpioe.pe2.into_push_pull_output(),
                lines: [
                    (
                        gpioe.pe3.into_push_pull_output().erase(),
                        gpiof.pf0.into_open_drain_output().internal_pull_up(true).erase(),
                    ),
                    (
                        gpioe.pe4.into_push_pull_output().erase(),
                        gpiof.pf1.into_open_drain_output().internal_pull_up(true).erase(),
                    ),
                    (
                        gpioe.pe5.into_push_pull_output().erase(),
                        gpiof.pf2.into_open_drain_output().internal_pull_up(true).erase(),
                    ),
                    (
                        gpioe.pe6.into_push_pull_output().erase(),
                        gpiof.pf3.into_open_drain_output().internal_pull_up(true).erase(),
                    ),
                    (
                        gpioe.pe7.into_push_pull_output().erase(),
                        gpiof.pf4.into_open_drain_output().internal_pull_up(true).erase(),
                    ),
                    (
                        gpioe.pe8.into_push_pull_output().erase(),
                        gpiof.pf5.into_open_drain_output().internal_pull_up(true).erase(),
                    ),
                ],
            },
        }
    }
}
