// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side stand-ins for GPIO lines and delays.

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub struct NoDelay;

impl DelayUs<u32> for NoDelay {
    fn delay_us(&mut self, _us: u32) {}
}

#[derive(Default)]
struct LineState {
    level: bool,
    rising_edges: u32,
}

/// A GPIO line that records its level. Clones observe the same line.
#[derive(Clone)]
pub struct Line(Rc<RefCell<LineState>>);

impl Line {
    pub fn new(level: bool) -> Self {
        Self(Rc::new(RefCell::new(LineState {
            level,
            rising_edges: 0,
        })))
    }

    pub fn level(&self) -> bool {
        self.0.borrow().level
    }

    pub fn rising_edges(&self) -> u32 {
        self.0.borrow().rising_edges
    }
}

impl OutputPin for Line {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().level = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut s = self.0.borrow_mut();
        if !s.level {
            s.rising_edges += 1;
        }
        s.level = true;
        Ok(())
    }
}

impl InputPin for Line {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.level())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.level())
    }
}
