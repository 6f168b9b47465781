//! Binary state and command frames.
//!
//! All multi-byte fields are big-endian. Analog quantities travel as
//! thousandths of their engineering unit (mV or µA), with `0xFFFF` meaning
//! the value has not been measured yet.
//!
//! ## State frame (slave to master, 25 bytes)
//!
//! ```text
//! [0]      modes    bit 7/5/3/1: DI1..DI4 monitored as digital
//!                   bit 6/4/2/0: group 1..4 measured as current
//! [1]      DO1..DO4 levels, DO1 = bit 3 .. DO4 = bit 0
//! [2..4]   AO1, mV
//! [4]      DI1..DI6 levels, DI1 = bit 5 .. DI6 = bit 0
//! [5..13]  analog groups 1..4, mV or µA
//! [13..25] DI1..DI6 rising-edge counters
//! ```
//!
//! ## Command frame (master to slave, 4 bytes)
//!
//! ```text
//! [0]      mask     DO1 = bit 4 .. DO4 = bit 1, AO1 = bit 0
//! [1]      DO1..DO4 levels, same layout as the state frame
//! [2..4]   AO1, mV
//! ```

use core::fmt;

use iono_core::{Channel, IoPins, Sampler, HIGH, LOW};

/// Encoded length of a [`StateFrame`].
pub const STATE_FRAME_LEN: usize = 25;

/// Encoded length of a [`CommandFrame`].
pub const COMMAND_FRAME_LEN: usize = 4;

/// Wire value of an analog quantity that is not known.
pub const UNKNOWN: u16 = 0xFFFF;

/// Digital outputs carried by the frames, in bit order.
pub const FRAME_OUTPUTS: [Channel; 4] = [Channel::DO1, Channel::DO2, Channel::DO3, Channel::DO4];

/// Error type for frame decoding and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload length does not match the frame layout.
    Length { expected: usize, actual: usize },
    /// Underlying writer failed.
    WriteError,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, actual } => {
                write!(f, "expected {} bytes, got {}", expected, actual)
            }
            Self::WriteError => write!(f, "write error"),
        }
    }
}

/// Encode a value as thousandths, rounded to nearest, never hitting [`UNKNOWN`].
#[inline]
#[must_use]
pub fn to_milli(value: f32) -> u16 {
    let milli = value * 1000.0 + 0.5;
    if milli <= 0.0 {
        0
    } else if milli >= (UNKNOWN - 1) as f32 {
        UNKNOWN - 1
    } else {
        milli as u16
    }
}

/// Decode thousandths, mapping [`UNKNOWN`] to `None`.
#[inline]
#[must_use]
pub fn from_milli(raw: u16) -> Option<f32> {
    (raw != UNKNOWN).then(|| f32::from(raw) / 1000.0)
}

/// Bit of a digital output in the levels byte.
pub(crate) const fn do_bit(channel: Channel) -> Option<u8> {
    match channel {
        Channel::DO1 => Some(3),
        Channel::DO2 => Some(2),
        Channel::DO3 => Some(1),
        Channel::DO4 => Some(0),
        _ => None,
    }
}

/// Bit of a digital input in the levels byte.
pub(crate) const fn di_bit(channel: Channel) -> Option<u8> {
    match channel {
        Channel::DI1 => Some(5),
        Channel::DI2 => Some(4),
        Channel::DI3 => Some(3),
        Channel::DI4 => Some(2),
        Channel::DI5 => Some(1),
        Channel::DI6 => Some(0),
        _ => None,
    }
}

/// Bit of an output in the command mask.
pub(crate) const fn mask_bit(channel: Channel) -> Option<u8> {
    match channel {
        Channel::AO1 => Some(0),
        _ => match do_bit(channel) {
            Some(bit) => Some(bit + 1),
            None => None,
        },
    }
}

#[inline]
pub(crate) fn set_bit(byte: &mut u8, bit: u8, on: bool) {
    if on {
        *byte |= 1 << bit;
    } else {
        *byte &= !(1 << bit);
    }
}

#[inline]
pub(crate) fn bit(byte: u8, bit: u8) -> bool {
    (byte >> bit) & 1 == 1
}

#[inline]
fn check_len(data: &[u8], expected: usize) -> Result<(), FrameError> {
    if data.len() == expected {
        Ok(())
    } else {
        Err(FrameError::Length {
            expected,
            actual: data.len(),
        })
    }
}

#[inline]
fn be16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

/// Snapshot of a slave's I/O as reported to the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateFrame {
    pub modes: u8,
    pub dos: u8,
    pub ao1: u16,
    pub dis: u8,
    /// Analog groups 1..4.
    pub analog: [u16; 4],
    /// Rising-edge counters of DI1..DI6.
    pub counters: [u16; 6],
}

impl StateFrame {
    /// State before anything has been measured.
    pub const fn new() -> Self {
        Self {
            modes: 0,
            dos: 0,
            ao1: UNKNOWN,
            dis: 0,
            analog: [UNKNOWN; 4],
            counters: [0; 6],
        }
    }

    /// Whether input group 1..=4 is monitored as a digital input.
    #[must_use]
    pub fn is_digital(&self, group: u8) -> bool {
        matches!(group, 1..=4) && bit(self.modes, 9 - 2 * group)
    }

    /// Whether input group 1..=4 is measured as current.
    #[must_use]
    pub fn is_current(&self, group: u8) -> bool {
        matches!(group, 1..=4) && bit(self.modes, 8 - 2 * group)
    }

    /// Encode to wire bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; STATE_FRAME_LEN] {
        let mut out = [0u8; STATE_FRAME_LEN];
        out[0] = self.modes;
        out[1] = self.dos;
        out[2..4].copy_from_slice(&self.ao1.to_be_bytes());
        out[4] = self.dis;
        let words = self.analog.iter().chain(self.counters.iter());
        for (i, word) in words.enumerate() {
            let at = 5 + i * 2;
            out[at..at + 2].copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Length`] unless `data` is exactly
    /// [`STATE_FRAME_LEN`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        check_len(data, STATE_FRAME_LEN)?;
        let mut frame = Self {
            modes: data[0],
            dos: data[1],
            ao1: be16(data, 2),
            dis: data[4],
            analog: [0; 4],
            counters: [0; 6],
        };
        for (i, word) in frame.analog.iter_mut().enumerate() {
            *word = be16(data, 5 + i * 2);
        }
        for (i, word) in frame.counters.iter_mut().enumerate() {
            *word = be16(data, 13 + i * 2);
        }
        Ok(frame)
    }

    /// Write the encoded frame to an `embedded_io::Write` implementation.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::WriteError`] if the write fails.
    #[cfg(feature = "embedded-io")]
    pub fn write_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), FrameError> {
        writer
            .write_all(&self.to_bytes())
            .map_err(|_| FrameError::WriteError)
    }
}

impl Default for StateFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&[u8]> for StateFrame {
    type Error = FrameError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

/// Output writes requested by the master.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    pub mask: u8,
    pub dos: u8,
    pub ao1: u16,
}

impl CommandFrame {
    /// Whether the frame carries a write for `channel`.
    #[must_use]
    pub fn targets(&self, channel: Channel) -> bool {
        mask_bit(channel).is_some_and(|b| bit(self.mask, b))
    }

    /// Channel writes carried by the frame, DO1..DO4 then AO1.
    ///
    /// Only channels whose mask bit is set are yielded.
    pub fn writes(self) -> impl Iterator<Item = (Channel, f32)> {
        FRAME_OUTPUTS
            .into_iter()
            .chain(core::iter::once(Channel::AO1))
            .filter(move |ch| self.targets(*ch))
            .map(move |ch| {
                let value = match do_bit(ch) {
                    Some(b) if bit(self.dos, b) => HIGH,
                    Some(_) => LOW,
                    None => f32::from(self.ao1) / 1000.0,
                };
                (ch, value)
            })
    }

    /// Perform the frame's writes on a local board.
    pub fn apply<P: IoPins>(self, sampler: &mut Sampler<P>) {
        for (channel, value) in self.writes() {
            sampler.write(channel, value);
        }
    }

    /// Encode to wire bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; COMMAND_FRAME_LEN] {
        let [hi, lo] = self.ao1.to_be_bytes();
        [self.mask, self.dos, hi, lo]
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Length`] unless `data` is exactly
    /// [`COMMAND_FRAME_LEN`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        check_len(data, COMMAND_FRAME_LEN)?;
        Ok(Self {
            mask: data[0],
            dos: data[1],
            ao1: be16(data, 2),
        })
    }

    /// Write the encoded frame to an `embedded_io::Write` implementation.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::WriteError`] if the write fails.
    #[cfg(feature = "embedded-io")]
    pub fn write_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), FrameError> {
        writer
            .write_all(&self.to_bytes())
            .map_err(|_| FrameError::WriteError)
    }
}

impl TryFrom<&[u8]> for CommandFrame {
    type Error = FrameError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_state_frame_layout() {
        let frame = StateFrame {
            modes: 0b1000_0100,
            dos: 0b1001,
            ao1: 5000,
            dis: 0b10_0001,
            analog: [UNKNOWN, 1234, UNKNOWN, 20_000],
            counters: [1, 2, 3, 4, 5, 0x0102],
        };
        let bytes = frame.to_bytes();

        assert_eq!(bytes[0], 0b1000_0100);
        assert_eq!(bytes[1], 0b1001);
        assert_eq!(&bytes[2..4], &[0x13, 0x88]);
        assert_eq!(bytes[4], 0b10_0001);
        assert_eq!(&bytes[5..7], &[0xFF, 0xFF]);
        assert_eq!(&bytes[7..9], &[0x04, 0xD2]);
        assert_eq!(&bytes[13..15], &[0x00, 0x01]);
        assert_eq!(&bytes[23..25], &[0x01, 0x02]);
        assert_eq!(StateFrame::from_bytes(&bytes), Ok(frame));
    }

    #[test]
    fn test_state_frame_mode_bits() {
        let frame = StateFrame {
            modes: 0b1000_0001,
            ..StateFrame::new()
        };
        assert!(frame.is_digital(1));
        assert!(!frame.is_current(1));
        assert!(!frame.is_digital(4));
        assert!(frame.is_current(4));
        assert!(!frame.is_digital(0));
        assert!(!frame.is_current(5));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_eq!(
            StateFrame::from_bytes(&[0; 24]),
            Err(FrameError::Length {
                expected: 25,
                actual: 24
            })
        );
        assert_eq!(
            CommandFrame::try_from(&[0u8; 5][..]),
            Err(FrameError::Length {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn test_command_writes_follow_mask() {
        // Mask selects DO2 and AO1 only; DO1 level bit is set but must be ignored.
        let cmd = CommandFrame::from_bytes(&[0b0_1001, 0b1100, 0x0B, 0xB8]).unwrap();
        let writes: Vec<_> = cmd.writes().collect();
        assert_eq!(writes, [(Channel::DO2, HIGH), (Channel::AO1, 3.0)]);
    }

    #[test]
    fn test_command_low_level() {
        let cmd = CommandFrame {
            mask: 0b0_0010,
            dos: 0b1110,
            ao1: 0,
        };
        let writes: Vec<_> = cmd.writes().collect();
        assert_eq!(writes, [(Channel::DO4, LOW)]);
        assert!(!cmd.targets(Channel::DO1));
        assert!(!cmd.targets(Channel::DI1));
    }

    #[derive(Default)]
    struct Pins {
        levels: [bool; 32],
        analog_out: Option<u32>,
    }

    impl IoPins for Pins {
        fn set_mode(&mut self, _pin: u8, _mode: iono_core::PinMode) {}

        fn digital_read(&mut self, pin: u8) -> bool {
            self.levels[usize::from(pin)]
        }

        fn digital_write(&mut self, pin: u8, high: bool) {
            self.levels[usize::from(pin)] = high;
        }

        fn analog_read(&mut self, _pin: u8) -> u16 {
            0
        }

        fn analog_write(&mut self, _pin: u8, raw: u32) {
            self.analog_out = Some(raw);
        }
    }

    #[test]
    fn test_apply_writes_masked_outputs() {
        let mut sampler = Sampler::new(Pins::default(), iono_core::BoardConfig::IONO_RP);
        let cmd = CommandFrame {
            mask: 0b1_0001,
            dos: 0b1100,
            ao1: 5000,
        };
        cmd.apply(&mut sampler);

        assert_eq!(sampler.read(Channel::DO1), Some(HIGH));
        assert_eq!(sampler.read(Channel::DO2), Some(LOW));
        assert_eq!(sampler.read(Channel::AO1), Some(5.0));
        assert_eq!(sampler.pins().analog_out, Some(32767));
    }

    #[test]
    fn test_milli_conversion() {
        assert_eq!(to_milli(3.3), 3300);
        assert_eq!(to_milli(-1.0), 0);
        assert_eq!(to_milli(100.0), UNKNOWN - 1);
        assert_eq!(from_milli(UNKNOWN), None);
        assert_eq!(from_milli(2500), Some(2.5));
    }
}
