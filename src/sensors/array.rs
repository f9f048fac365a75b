// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Channel state shared by the command handlers and the background sampler.
//!
//! - `sample` is the only writer of the position cache.
//! - `calibrate` is the only writer of the offsets.
//! - `clear_errors` is the only thing that clears the error flags, called once a report is sent.
//!
//! All three run from the main loop. Nothing here may be touched from an interrupt handler.

use crate::config::CHANNEL_COUNT;
use crate::drivers::ercks::ReadError;
use crate::protocol::ResponseFrame;
use crate::storage::{CalibrationStore, Eeprom};

/// Something that can read the raw angle of a channel.
///
/// Angles are in `0..=ANGLE_MAX`.
pub trait AngleSource {
    fn read_angle(&mut self, channel: usize) -> Result<u16, ReadError>;
}

/// One bit per channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorFlags(u8);

impl ErrorFlags {
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn set(&mut self, channel: usize) {
        self.0 |= 1 << channel;
    }

    #[inline]
    pub const fn is_set(self, channel: usize) -> bool {
        (self.0 & (1 << channel)) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flags set in `self` but not in `other`.
    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Return the current flags and clear them.
    #[inline]
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

/// Per-channel state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Channel {
    /// Raw angle that reads as zero.
    pub offset: i16,
    /// Raw angle from the most recent sample pass (0 if that read failed).
    pub position: i16,
}

impl Channel {
    /// Calibrated position as sent to the host.
    #[inline]
    pub fn adjusted(&self) -> i16 {
        self.position.wrapping_sub(self.offset)
    }
}

/// Outcome of a calibration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration<E> {
    /// Channels whose sensor read failed; their offset is now 0.
    pub failed: ErrorFlags,
    /// Channels whose new offset could not be persisted.
    pub unsaved: ErrorFlags,
    /// Most recent persistence error, if any.
    pub store_error: Option<E>,
}

/// Six sensor channels plus their calibration and error bookkeeping.
pub struct SensorArray<S> {
    source: S,
    channels: [Channel; CHANNEL_COUNT],
    errors: ErrorFlags,
}

impl<S: AngleSource> SensorArray<S> {
    /// `offsets` are the persisted calibration values, usually from
    /// [`CalibrationStore::load_all`].
    pub fn new(source: S, offsets: [i16; CHANNEL_COUNT]) -> Self {
        Self {
            source,
            channels: offsets.map(|offset| Channel {
                offset,
                position: 0,
            }),
            errors: ErrorFlags::NONE,
        }
    }

    /// Background sample: read every channel into the position cache.
    ///
    /// A failed channel gets its error flag set and its cached position zeroed. Returns the
    /// channels that failed in this pass.
    pub fn sample(&mut self) -> ErrorFlags {
        let mut failed = ErrorFlags::NONE;
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            match self.source.read_angle(ch) {
                Ok(angle) => channel.position = angle as i16,
                Err(_) => {
                    failed.set(ch);
                    channel.position = 0;
                }
            }
        }
        self.errors = ErrorFlags(self.errors.0 | failed.0);
        failed
    }

    /// Take fresh readings as the new zero offsets, persisting each success immediately.
    ///
    /// A channel whose read fails gets its error flag set and its live offset reset to 0. Its
    /// stored slot is left untouched, so the previous calibration comes back after a reset.
    pub fn calibrate<E: Eeprom>(
        &mut self,
        store: &mut CalibrationStore<E>,
    ) -> Calibration<E::Error> {
        let mut outcome = Calibration {
            failed: ErrorFlags::NONE,
            unsaved: ErrorFlags::NONE,
            store_error: None,
        };

        for (ch, channel) in self.channels.iter_mut().enumerate() {
            match self.source.read_angle(ch) {
                Ok(angle) => {
                    channel.offset = angle as i16;
                    if let Err(e) = store.put(ch, channel.offset) {
                        outcome.unsaved.set(ch);
                        outcome.store_error = Some(e);
                    }
                }
                Err(_) => {
                    outcome.failed.set(ch);
                    self.errors.set(ch);
                    channel.offset = 0;
                }
            }
        }
        outcome
    }

    /// Build the reply to a read command from the cached positions and accumulated flags.
    ///
    /// The flags stay set until [`clear_errors`](Self::clear_errors) is called once the reply
    /// has reached the host.
    pub fn report(&self) -> ResponseFrame {
        ResponseFrame::new(&self.adjusted(), self.errors.bits())
    }

    /// Clear the accumulated flags and return them.
    #[inline]
    pub fn clear_errors(&mut self) -> ErrorFlags {
        self.errors.take()
    }

    /// Calibrated positions from the cache.
    pub fn adjusted(&self) -> [i16; CHANNEL_COUNT] {
        self.channels.map(|c| c.adjusted())
    }

    pub fn offsets(&self) -> [i16; CHANNEL_COUNT] {
        self.channels.map(|c| c.offset)
    }

    pub fn positions(&self) -> [i16; CHANNEL_COUNT] {
        self.channels.map(|c| c.position)
    }

    /// Flags accumulated since the last report.
    #[inline]
    pub fn errors(&self) -> ErrorFlags {
        self.errors
    }

    #[inline]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn free(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RamEeprom;

    /// Scripted angles; `None` fails the read.
    struct Script([Option<u16>; CHANNEL_COUNT]);

    impl AngleSource for Script {
        fn read_angle(&mut self, channel: usize) -> Result<u16, ReadError> {
            self.0[channel].ok_or(ReadError::Device)
        }
    }

    fn all(angles: [u16; CHANNEL_COUNT]) -> Script {
        Script(angles.map(Some))
    }

    #[test]
    fn error_flag_helpers() {
        let mut f = ErrorFlags::NONE;
        f.set(0);
        f.set(5);
        assert_eq!(f.bits(), 0b10_0001);
        assert!(f.is_set(5) && !f.is_set(1));
        assert_eq!(f.without(ErrorFlags::from_bits(1)).bits(), 0b10_0000);
        assert_eq!(f.take().bits(), 0b10_0001);
        assert!(f.is_empty());
    }

    #[test]
    fn sample_fills_cache_and_flags_failures() {
        let mut array = SensorArray::new(all([10, 20, 30, 40, 50, 60]), [0; CHANNEL_COUNT]);
        assert!(array.sample().is_empty());
        assert_eq!(array.positions(), [10, 20, 30, 40, 50, 60]);

        array.source_mut().0[2] = None;
        let failed = array.sample();
        assert_eq!(failed.bits(), 0b100);
        assert_eq!(array.positions(), [10, 20, 0, 40, 50, 60]);
        assert_eq!(array.errors().bits(), 0b100);

        // Recovery overwrites the zero, but the flag stays until reported.
        array.source_mut().0[2] = Some(33);
        assert!(array.sample().is_empty());
        assert_eq!(array.positions()[2], 33);
        assert_eq!(array.errors().bits(), 0b100);
    }

    #[test]
    fn flags_accumulate_until_reported() {
        let mut array = SensorArray::new(all([1; CHANNEL_COUNT]), [0; CHANNEL_COUNT]);
        array.source_mut().0[0] = None;
        array.sample();
        array.source_mut().0[0] = Some(1);
        array.source_mut().0[4] = None;
        array.sample();
        assert_eq!(array.errors().bits(), 0b1_0001);

        let frame = array.report();
        assert_eq!(frame.as_bytes()[13], 0b1_0001);
        // Building a reply alone does not clear them.
        assert_eq!(array.errors().bits(), 0b1_0001);

        assert_eq!(array.clear_errors().bits(), 0b1_0001);
        assert!(array.errors().is_empty());
        assert_eq!(array.report().as_bytes()[13], 0);
    }

    #[test]
    fn report_subtracts_offsets_from_cached_positions() {
        let mut array = SensorArray::new(all([10, 20, 30, 40, 50, 60]), [1, 2, 3, 4, 5, 6]);
        array.sample();

        // A change after sampling is not seen by the report.
        array.source_mut().0 = [Some(999); CHANNEL_COUNT];
        let frame = array.report();
        let report = ResponseFrame::decode(frame.as_bytes()).unwrap();
        assert_eq!(report.positions, [9, 18, 27, 36, 45, 54]);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn adjusted_can_go_negative() {
        let mut array = SensorArray::new(all([5, 0, 0, 0, 0, 0]), [16000, 0, 0, 0, 0, 0]);
        array.sample();
        assert_eq!(array.adjusted()[0], 5 - 16000);
    }

    #[test]
    fn calibrate_persists_successes_and_zeroes_failures() {
        let mut store = CalibrationStore::new(RamEeprom::<16>::new());
        store.put(3, 777).unwrap();

        let mut script = all([11, 22, 33, 44, 55, 66]);
        script.0[3] = None;
        let mut array = SensorArray::new(script, [7; CHANNEL_COUNT]);

        let outcome = array.calibrate(&mut store);
        assert_eq!(outcome.failed.bits(), 0b1000);
        assert!(outcome.unsaved.is_empty());
        assert_eq!(array.offsets(), [11, 22, 33, 0, 55, 66]);
        assert!(array.errors().is_set(3));

        // The failed channel keeps its old persisted value.
        assert_eq!(store.load_all().unwrap(), [11, 22, 33, 777, 55, 66]);
        // One write for the setup plus one per successful channel.
        assert_eq!(store.eeprom().writes(), 6);
    }

    #[test]
    fn calibrate_reports_store_failures() {
        // Only room for the first two slots.
        let mut store = CalibrationStore::new(RamEeprom::<4>::new());
        let mut array = SensorArray::new(all([1, 2, 3, 4, 5, 6]), [0; CHANNEL_COUNT]);

        let outcome = array.calibrate(&mut store);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.unsaved.bits(), 0b11_1100);
        assert!(outcome.store_error.is_some());
        assert_eq!(array.offsets(), [1, 2, 3, 4, 5, 6]);
    }
}
