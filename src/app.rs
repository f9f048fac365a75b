// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Main loop state: host command handling and background sampling.
//!
//! One tick is:
//! 1. drain every byte the host link has buffered through the frame parser, running each command
//!    to completion as it is recognized,
//! 2. sample all six sensors into the position cache.
//!
//! The caller sleeps between ticks. Everything runs on the one thread of control; commands block
//! the loop while they execute.

use core::fmt;

use embedded_hal::serial;

use crate::config::CHANNEL_COUNT;
use crate::protocol::{Command, Parser};
use crate::sensors::{AngleSource, ErrorFlags, SensorArray};
use crate::storage::{CalibrationStore, Eeprom};
use crate::{log_debug, log_info, log_warn};

pub struct App<S, E, L> {
    parser: Parser,
    array: SensorArray<S>,
    store: CalibrationStore<E>,
    log: L,
    /// Channels that failed in the previous sample pass.
    last_failed: ErrorFlags,
    /// Parser reject count at the last log line.
    rejected_seen: u32,
}

impl<S, E, L> App<S, E, L>
where
    S: AngleSource,
    E: Eeprom,
    L: fmt::Write,
{
    /// Load the calibration table and take ownership of the sensors.
    ///
    /// An unreadable table is logged and treated as all-zero offsets.
    pub fn new(source: S, mut store: CalibrationStore<E>, mut log: L) -> Self {
        let offsets = match store.load_all() {
            Ok(offsets) => {
                log_info!(log, "offsets loaded: {:?}", offsets);
                offsets
            }
            Err(e) => {
                log_warn!(log, "offset load failed ({:?}), using zeros", e);
                [0; CHANNEL_COUNT]
            }
        };

        Self {
            parser: Parser::new(),
            array: SensorArray::new(source, offsets),
            store,
            log,
            last_failed: ErrorFlags::NONE,
            rejected_seen: 0,
        }
    }

    /// Run one loop iteration (without the idle delay). Returns the channels that failed in this
    /// tick's sample pass.
    pub fn tick<RX, TX>(&mut self, rx: &mut RX, tx: &mut TX) -> ErrorFlags
    where
        RX: serial::Read<u8>,
        RX::Error: fmt::Debug,
        TX: serial::Write<u8>,
        TX::Error: fmt::Debug,
    {
        self.poll_serial(rx, tx);
        self.sample()
    }

    /// Feed every byte currently buffered on `rx` to the parser. Never waits for more.
    ///
    /// Returns the number of bytes consumed.
    pub fn poll_serial<RX, TX>(&mut self, rx: &mut RX, tx: &mut TX) -> usize
    where
        RX: serial::Read<u8>,
        RX::Error: fmt::Debug,
        TX: serial::Write<u8>,
        TX::Error: fmt::Debug,
    {
        let mut consumed = 0;
        loop {
            match rx.read() {
                Ok(byte) => {
                    consumed += 1;
                    if let Some(cmd) = self.parser.push(byte) {
                        self.dispatch(cmd, tx);
                    }
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => {
                    log_warn!(self.log, "host rx error: {:?}", e);
                    break;
                }
            }
        }

        let rejected = self.parser.rejected();
        if rejected != self.rejected_seen {
            log_debug!(
                self.log,
                "dropped {} host frame(s)",
                rejected.wrapping_sub(self.rejected_seen)
            );
            self.rejected_seen = rejected;
        }
        consumed
    }

    /// Execute one command synchronously.
    pub fn dispatch<TX>(&mut self, cmd: Command, tx: &mut TX)
    where
        TX: serial::Write<u8>,
        TX::Error: fmt::Debug,
    {
        match cmd {
            Command::Calibrate => self.calibrate(),
            Command::Read => self.read(tx),
        }
    }

    fn calibrate(&mut self) {
        let outcome = self.array.calibrate(&mut self.store);
        log_info!(self.log, "calibrated: {:?}", self.array.offsets());

        if !outcome.failed.is_empty() {
            log_warn!(
                self.log,
                "calibration read failed on {:#08b}, offsets zeroed",
                outcome.failed.bits()
            );
        }
        if let Some(e) = outcome.store_error {
            log_warn!(
                self.log,
                "offsets not persisted on {:#08b}: {:?}",
                outcome.unsaved.bits(),
                e
            );
        }
    }

    fn read<TX>(&mut self, tx: &mut TX)
    where
        TX: serial::Write<u8>,
        TX::Error: fmt::Debug,
    {
        let frame = self.array.report();
        log_debug!(self.log, "read: {:02X?}", frame.as_bytes());

        let sent = frame
            .as_bytes()
            .iter()
            .try_for_each(|&b| nb::block!(tx.write(b)))
            .and_then(|()| nb::block!(tx.flush()));
        match sent {
            Ok(()) => {
                self.array.clear_errors();
            }
            Err(e) => {
                log_warn!(self.log, "host tx error: {:?}, error flags kept", e);
            }
        }
    }

    /// Background sample pass. Logs channels that start or stop failing.
    pub fn sample(&mut self) -> ErrorFlags {
        let failed = self.array.sample();

        let new = failed.without(self.last_failed);
        if !new.is_empty() {
            log_warn!(self.log, "sensor read failing on {:#08b}", new.bits());
        }
        let recovered = self.last_failed.without(failed);
        if !recovered.is_empty() {
            log_info!(self.log, "sensor read recovered on {:#08b}", recovered.bits());
        }

        self.last_failed = failed;
        failed
    }

    #[inline]
    pub fn array(&self) -> &SensorArray<S> {
        &self.array
    }

    #[inline]
    pub fn array_mut(&mut self) -> &mut SensorArray<S> {
        &mut self.array
    }

    #[inline]
    pub fn store(&self) -> &CalibrationStore<E> {
        &self.store
    }

    #[inline]
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    #[inline]
    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn free(self) -> (S, CalibrationStore<E>, L) {
        (self.array.free(), self.store, self.log)
    }
}
