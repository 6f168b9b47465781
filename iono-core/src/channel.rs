//! Logical channel identities: Channel, ChannelKind, InputMode.

use core::fmt;

/// A logical I/O point of the board.
///
/// The numeric value of each variant is its stable index, shared with every
/// protocol adapter (Modbus maps, LoRa frames, serial console).
///
/// Input groups 1..=4 expose the same physical terminal three ways: as a
/// digital input (`DIn`), a voltage input (`AVn`) or a current input (`AIn`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    DO1 = 0,
    DO2 = 1,
    DO3 = 2,
    DO4 = 3,
    DO5 = 4,
    DO6 = 5,
    DI1 = 6,
    AV1 = 7,
    AI1 = 8,
    DI2 = 9,
    AV2 = 10,
    AI2 = 11,
    DI3 = 12,
    AV3 = 13,
    AI3 = 14,
    DI4 = 15,
    AV4 = 16,
    AI4 = 17,
    DI5 = 18,
    DI6 = 19,
    AO1 = 20,
}

/// Number of logical channels.
pub const CHANNEL_COUNT: usize = 21;

/// Error converting a raw value into a channel-level type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// No channel has this index.
    UnknownChannel(u8),
    /// No link mode has this code.
    UnknownLinkMode(u8),
}

/// Direction and unit class of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelKind {
    DigitalOutput,
    DigitalInput,
    /// Voltage input, read in volts.
    AnalogVoltage,
    /// Current input, read in milliamps.
    AnalogCurrent,
    /// Analog output, written in volts and never physically read back.
    AnalogOutput,
}

/// Interpretation of a tri-mode input terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMode {
    Digital,
    Voltage,
    Current,
}

impl Channel {
    /// All channels in index order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::DO1,
        Channel::DO2,
        Channel::DO3,
        Channel::DO4,
        Channel::DO5,
        Channel::DO6,
        Channel::DI1,
        Channel::AV1,
        Channel::AI1,
        Channel::DI2,
        Channel::AV2,
        Channel::AI2,
        Channel::DI3,
        Channel::AV3,
        Channel::AI3,
        Channel::DI4,
        Channel::AV4,
        Channel::AI4,
        Channel::DI5,
        Channel::DI6,
        Channel::AO1,
    ];

    /// Digital outputs in order.
    pub const DIGITAL_OUTPUTS: [Channel; 6] = [
        Channel::DO1,
        Channel::DO2,
        Channel::DO3,
        Channel::DO4,
        Channel::DO5,
        Channel::DO6,
    ];

    /// Digital inputs in order.
    pub const DIGITAL_INPUTS: [Channel; 6] = [
        Channel::DI1,
        Channel::DI2,
        Channel::DI3,
        Channel::DI4,
        Channel::DI5,
        Channel::DI6,
    ];

    /// Stable numeric index of the channel.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Look up a channel by index.
    #[inline]
    #[must_use]
    pub fn from_index(index: u8) -> Option<Channel> {
        Self::ALL.get(usize::from(index)).copied()
    }

    #[must_use]
    pub const fn kind(self) -> ChannelKind {
        match self {
            Channel::DO1
            | Channel::DO2
            | Channel::DO3
            | Channel::DO4
            | Channel::DO5
            | Channel::DO6 => ChannelKind::DigitalOutput,
            Channel::DI1
            | Channel::DI2
            | Channel::DI3
            | Channel::DI4
            | Channel::DI5
            | Channel::DI6 => ChannelKind::DigitalInput,
            Channel::AV1 | Channel::AV2 | Channel::AV3 | Channel::AV4 => {
                ChannelKind::AnalogVoltage
            }
            Channel::AI1 | Channel::AI2 | Channel::AI3 | Channel::AI4 => {
                ChannelKind::AnalogCurrent
            }
            Channel::AO1 => ChannelKind::AnalogOutput,
        }
    }

    /// Check if the channel accepts writes.
    #[inline]
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(
            self.kind(),
            ChannelKind::DigitalOutput | ChannelKind::AnalogOutput
        )
    }

    /// Check if the channel carries a boolean level.
    #[inline]
    #[must_use]
    pub const fn is_digital(self) -> bool {
        matches!(
            self.kind(),
            ChannelKind::DigitalOutput | ChannelKind::DigitalInput
        )
    }

    /// Check if the channel is a voltage or current input.
    #[inline]
    #[must_use]
    pub const fn is_analog_input(self) -> bool {
        matches!(
            self.kind(),
            ChannelKind::AnalogVoltage | ChannelKind::AnalogCurrent
        )
    }

    /// Tri-mode input group (1..=4) this channel belongs to, if any.
    #[must_use]
    pub const fn group(self) -> Option<u8> {
        match self {
            Channel::DI1 | Channel::AV1 | Channel::AI1 => Some(1),
            Channel::DI2 | Channel::AV2 | Channel::AI2 => Some(2),
            Channel::DI3 | Channel::AV3 | Channel::AI3 => Some(3),
            Channel::DI4 | Channel::AV4 | Channel::AI4 => Some(4),
            _ => None,
        }
    }

    /// Mode under which a tri-mode input is being read.
    #[must_use]
    pub const fn input_mode(self) -> Option<InputMode> {
        if self.group().is_none() {
            return None;
        }
        Some(match self.kind() {
            ChannelKind::AnalogVoltage => InputMode::Voltage,
            ChannelKind::AnalogCurrent => InputMode::Current,
            _ => InputMode::Digital,
        })
    }

    /// Channel reading tri-mode input `group` (1..=4) in the given mode.
    #[must_use]
    pub const fn input(group: u8, mode: InputMode) -> Option<Channel> {
        if group < 1 || group > 4 {
            return None;
        }
        // DIn, AVn, AIn are consecutive, three per group starting at DI1.
        let base = Channel::DI1 as u8 + (group - 1) * 3;
        let index = match mode {
            InputMode::Digital => base,
            InputMode::Voltage => base + 1,
            InputMode::Current => base + 2,
        };
        Some(Self::ALL[index as usize])
    }

    /// Short terminal name, e.g. `"DO1"` or `"AV3"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Channel::DO1 => "DO1",
            Channel::DO2 => "DO2",
            Channel::DO3 => "DO3",
            Channel::DO4 => "DO4",
            Channel::DO5 => "DO5",
            Channel::DO6 => "DO6",
            Channel::DI1 => "DI1",
            Channel::AV1 => "AV1",
            Channel::AI1 => "AI1",
            Channel::DI2 => "DI2",
            Channel::AV2 => "AV2",
            Channel::AI2 => "AI2",
            Channel::DI3 => "DI3",
            Channel::AV3 => "AV3",
            Channel::AI3 => "AI3",
            Channel::DI4 => "DI4",
            Channel::AV4 => "AV4",
            Channel::AI4 => "AI4",
            Channel::DI5 => "DI5",
            Channel::DI6 => "DI6",
            Channel::AO1 => "AO1",
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = ChannelError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Channel::from_index(index).ok_or(ChannelError::UnknownChannel(index))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_index_round_trips_through_all() {
        for (i, ch) in Channel::ALL.iter().enumerate() {
            assert_eq!(ch.index() as usize, i);
            assert_eq!(Channel::try_from(i as u8), Ok(*ch));
        }
    }

    #[test]
    fn test_unknown_index_rejected() {
        assert_eq!(
            Channel::try_from(21),
            Err(ChannelError::UnknownChannel(21))
        );
        assert_eq!(Channel::from_index(255), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Channel::DO5.kind(), ChannelKind::DigitalOutput);
        assert_eq!(Channel::DI2.kind(), ChannelKind::DigitalInput);
        assert_eq!(Channel::AV3.kind(), ChannelKind::AnalogVoltage);
        assert_eq!(Channel::AI4.kind(), ChannelKind::AnalogCurrent);
        assert_eq!(Channel::AO1.kind(), ChannelKind::AnalogOutput);
        assert!(Channel::AO1.is_output());
        assert!(!Channel::DI1.is_output());
        assert!(Channel::AI1.is_analog_input());
        assert!(!Channel::AO1.is_analog_input());
    }

    #[test]
    fn test_input_groups_and_modes() {
        assert_eq!(Channel::input(1, InputMode::Digital), Some(Channel::DI1));
        assert_eq!(Channel::input(2, InputMode::Voltage), Some(Channel::AV2));
        assert_eq!(Channel::input(4, InputMode::Current), Some(Channel::AI4));
        assert_eq!(Channel::input(0, InputMode::Digital), None);
        assert_eq!(Channel::input(5, InputMode::Digital), None);

        assert_eq!(Channel::AI3.group(), Some(3));
        assert_eq!(Channel::AI3.input_mode(), Some(InputMode::Current));
        assert_eq!(Channel::DI4.input_mode(), Some(InputMode::Digital));
        assert_eq!(Channel::DI5.group(), None);
        assert_eq!(Channel::DI5.input_mode(), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Channel::AV3.to_string(), "AV3");
        assert_eq!(Channel::AO1.name(), "AO1");
    }
}
