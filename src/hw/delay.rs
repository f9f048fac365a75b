// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Busy-wait microsecond delay for bit-banged bus timing.
//!
//! SysTick is left to the main loop delay; the bus only needs short, approximate waits, so this
//! counts core cycles instead.

use embedded_hal::blocking::delay::DelayUs;

pub struct CycleDelay {
    cycles_per_us: u32,
}

impl CycleDelay {
    /// `sysclk_hz` is the core clock, e.g. `clocks.sysclk().raw()`.
    pub fn new(sysclk_hz: u32) -> Self {
        Self {
            cycles_per_us: (sysclk_hz / 1_000_000).max(1),
        }
    }
}

impl DelayUs<u32> for CycleDelay {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        cortex_m::asm::delay(us.saturating_mul(self.cycles_per_us));
    }
}
