// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board status LEDs.
//!
//! - `Led` remembers its active level and last state.
//! - `StatusLeds` drives the fault LED from the latest sample pass and toggles a heartbeat every
//!   `period` loop ticks.

use embedded_hal::digital::v2::OutputPin;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.set(false);
        led
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        let high = on == (self.active == ActiveLevel::High);
        if high {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.is_on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }
}

pub struct StatusLeds<FAULT: OutputPin, BEAT: OutputPin> {
    fault: Led<FAULT>,
    heartbeat: Led<BEAT>,
    period: u32,
    ticks: u32,
}

impl<FAULT: OutputPin, BEAT: OutputPin> StatusLeds<FAULT, BEAT> {
    /// `period` is the number of `update` calls per heartbeat toggle (at least 1).
    pub fn new(fault: Led<FAULT>, heartbeat: Led<BEAT>, period: u32) -> Self {
        Self {
            fault,
            heartbeat,
            period: period.max(1),
            ticks: 0,
        }
    }

    /// Show whether any channel failed in the latest sample pass, and advance the heartbeat.
    pub fn update(&mut self, any_failed: bool) {
        self.fault.set(any_failed);

        self.ticks += 1;
        if self.ticks >= self.period {
            self.ticks = 0;
            self.heartbeat.toggle();
        }
    }
}
