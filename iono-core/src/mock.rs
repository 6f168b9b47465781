//! Host-side pin and clock doubles for unit tests.

extern crate std;

use core::cell::Cell;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::hal::{Clock, IoPins, PinMode};

const PIN_COUNT: usize = 32;

/// In-memory pin bank.
///
/// Digital writes land in the same level table digital reads come from, so
/// outputs read back what was last driven.
pub struct MockPins {
    levels: [bool; PIN_COUNT],
    analog: [u16; PIN_COUNT],
    queued: Vec<VecDeque<u16>>,
    modes: [Option<PinMode>; PIN_COUNT],
    analog_out: [Option<u32>; PIN_COUNT],
    digital_writes: usize,
}

impl MockPins {
    pub fn new() -> Self {
        Self {
            levels: [false; PIN_COUNT],
            analog: [0; PIN_COUNT],
            queued: (0..PIN_COUNT).map(|_| VecDeque::new()).collect(),
            modes: [None; PIN_COUNT],
            analog_out: [None; PIN_COUNT],
            digital_writes: 0,
        }
    }

    pub fn set_digital(&mut self, pin: u8, high: bool) {
        self.levels[usize::from(pin)] = high;
    }

    pub fn set_analog(&mut self, pin: u8, raw: u16) {
        self.analog[usize::from(pin)] = raw;
    }

    /// Serve these conversions before falling back to the steady value.
    pub fn queue_analog(&mut self, pin: u8, raws: &[u16]) {
        self.queued[usize::from(pin)].extend(raws.iter().copied());
    }

    pub fn level(&self, pin: u8) -> bool {
        self.levels[usize::from(pin)]
    }

    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.modes[usize::from(pin)]
    }

    pub fn analog_out(&self, pin: u8) -> Option<u32> {
        self.analog_out[usize::from(pin)]
    }

    pub fn digital_writes(&self) -> usize {
        self.digital_writes
    }
}

impl IoPins for MockPins {
    fn set_mode(&mut self, pin: u8, mode: PinMode) {
        self.modes[usize::from(pin)] = Some(mode);
    }

    fn digital_read(&mut self, pin: u8) -> bool {
        self.levels[usize::from(pin)]
    }

    fn digital_write(&mut self, pin: u8, high: bool) {
        self.digital_writes += 1;
        self.levels[usize::from(pin)] = high;
    }

    fn analog_read(&mut self, pin: u8) -> u16 {
        let pin = usize::from(pin);
        self.queued[pin].pop_front().unwrap_or(self.analog[pin])
    }

    fn analog_write(&mut self, pin: u8, raw: u32) {
        self.analog_out[usize::from(pin)] = Some(raw);
    }
}

/// Manually advanced millisecond clock.
#[derive(Default)]
pub struct MockClock {
    now: Cell<u64>,
}

impl MockClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
