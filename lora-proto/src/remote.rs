//! Master-side mirror of a remote slave board.

use core::fmt;

use iono_core::{Channel, InputMode, CHANNEL_COUNT, HIGH, LOW};

use crate::frame::{bit, di_bit, do_bit, from_milli, mask_bit, set_bit, to_milli, CommandFrame, StateFrame};

/// Highest AO1 value a command may carry, volts.
pub const AO1_MAX: f32 = 10.0;

/// Rejected remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Channel cannot be written over the link.
    UnsupportedChannel(Channel),
    /// Value is not a level (DO) or outside `0..=AO1_MAX` (AO1).
    OutOfRange(Channel),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedChannel(ch) => write!(f, "{} is not remotely writable", ch),
            Self::OutOfRange(ch) => write!(f, "value out of range for {}", ch),
        }
    }
}

/// Last known I/O of a remote board plus the command queued for it.
pub struct RemoteSlave {
    values: [Option<f32>; CHANNEL_COUNT],
    state: Option<StateFrame>,
    command: CommandFrame,
    command_changed: bool,
}

impl RemoteSlave {
    /// Create a mirror with every value unknown.
    pub fn new() -> Self {
        Self {
            values: [None; CHANNEL_COUNT],
            state: None,
            command: CommandFrame::default(),
            command_changed: false,
        }
    }

    /// Replace the mirrored values with a received state frame.
    ///
    /// Groups 1..4 expose only the channel of the mode the slave reports;
    /// the other channels of the group read as unknown.
    pub fn update_state(&mut self, frame: &StateFrame) {
        let level = |byte: u8, b: u8| if bit(byte, b) { HIGH } else { LOW };
        self.values = [None; CHANNEL_COUNT];

        for ch in Channel::ALL {
            if let Some(b) = do_bit(ch) {
                self.set(ch, Some(level(frame.dos, b)));
            }
        }
        self.set(Channel::AO1, from_milli(frame.ao1));
        self.set(Channel::DI5, Some(level(frame.dis, 1)));
        self.set(Channel::DI6, Some(level(frame.dis, 0)));

        for group in 1..=4u8 {
            let analog = from_milli(frame.analog[usize::from(group - 1)]);
            let mode = if frame.is_current(group) {
                InputMode::Current
            } else {
                InputMode::Voltage
            };
            if let Some(ch) = Channel::input(group, mode) {
                self.set(ch, analog);
            }
            if frame.is_digital(group) {
                if let Some(ch) = Channel::input(group, InputMode::Digital) {
                    let value = di_bit(ch).map(|b| level(frame.dis, b));
                    self.set(ch, value);
                }
            }
        }
        self.state = Some(*frame);
    }

    fn set(&mut self, channel: Channel, value: Option<f32>) {
        self.values[usize::from(channel.index())] = value;
    }

    /// Last reported value of `channel`, `None` while unknown.
    #[must_use]
    pub fn read(&self, channel: Channel) -> Option<f32> {
        self.values[usize::from(channel.index())]
    }

    /// Rising-edge count of digital input DI1..DI6.
    #[must_use]
    pub fn di_count(&self, channel: Channel) -> Option<u16> {
        let b = di_bit(channel)?;
        let counters = self.state.map_or([0; 6], |s| s.counters);
        Some(counters[usize::from(5 - b)])
    }

    /// Queue a write of DO1..DO4 or AO1 for the next command frame.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for other channels, for digital values other
    /// than `0.0`/`1.0`, and for AO1 values outside `0..=AO1_MAX`.
    pub fn write(&mut self, channel: Channel, value: f32) -> Result<(), CommandError> {
        let mask = mask_bit(channel).ok_or(CommandError::UnsupportedChannel(channel))?;
        match do_bit(channel) {
            Some(b) => {
                if value != HIGH && value != LOW {
                    return Err(CommandError::OutOfRange(channel));
                }
                set_bit(&mut self.command.dos, b, value == HIGH);
            }
            None => {
                if !(0.0..=AO1_MAX).contains(&value) {
                    return Err(CommandError::OutOfRange(channel));
                }
                self.command.ao1 = to_milli(value);
            }
        }
        set_bit(&mut self.command.mask, mask, true);
        self.command_changed = true;
        Ok(())
    }

    /// Take the queued command for transmission if it changed since the last take.
    pub fn take_command(&mut self) -> Option<CommandFrame> {
        if core::mem::take(&mut self.command_changed) {
            Some(self.command)
        } else {
            None
        }
    }

    /// Whether the last state frame shows every queued write applied.
    ///
    /// Once confirmed, the queued writes are cleared so later commands carry
    /// only new writes.
    pub fn command_confirmed(&mut self) -> bool {
        let Some(state) = self.state else {
            return self.command.mask == 0;
        };
        let cmd = self.command;
        let confirmed = cmd.writes().all(|(ch, _)| match do_bit(ch) {
            Some(b) => bit(cmd.dos, b) == bit(state.dos, b),
            None => cmd.ao1 == state.ao1,
        });
        if confirmed {
            self.command.mask = 0;
        }
        confirmed
    }
}

impl Default for RemoteSlave {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::UNKNOWN;

    fn state() -> StateFrame {
        StateFrame {
            // DI1 digital, group 2 current, groups 3/4 voltage.
            modes: 0b1001_0000,
            dos: 0b1010,
            ao1: 4000,
            dis: 0b10_0010,
            analog: [UNKNOWN, 12_000, 3300, UNKNOWN],
            counters: [7, 0, 0, 0, 2, 9],
        }
    }

    #[test]
    fn test_unknown_before_first_state() {
        let r = RemoteSlave::new();
        assert_eq!(r.read(Channel::DO1), None);
        assert_eq!(r.read(Channel::AV1), None);
        assert_eq!(r.di_count(Channel::DI1), Some(0));
    }

    #[test]
    fn test_update_state_values() {
        let mut r = RemoteSlave::new();
        r.update_state(&state());

        assert_eq!(r.read(Channel::DO1), Some(HIGH));
        assert_eq!(r.read(Channel::DO2), Some(LOW));
        assert_eq!(r.read(Channel::DO3), Some(HIGH));
        assert_eq!(r.read(Channel::AO1), Some(4.0));

        assert_eq!(r.read(Channel::DI1), Some(HIGH));
        assert_eq!(r.read(Channel::DI2), None);
        assert_eq!(r.read(Channel::DI5), Some(HIGH));
        assert_eq!(r.read(Channel::DI6), Some(LOW));

        assert_eq!(r.read(Channel::AV1), None);
        assert_eq!(r.read(Channel::AI2), Some(12.0));
        assert_eq!(r.read(Channel::AV2), None);
        assert_eq!(r.read(Channel::AV3), Some(3.3));
        assert_eq!(r.read(Channel::AI3), None);
    }

    #[test]
    fn test_di_counts() {
        let mut r = RemoteSlave::new();
        r.update_state(&state());
        assert_eq!(r.di_count(Channel::DI1), Some(7));
        assert_eq!(r.di_count(Channel::DI5), Some(2));
        assert_eq!(r.di_count(Channel::DI6), Some(9));
        assert_eq!(r.di_count(Channel::AV1), None);
    }

    #[test]
    fn test_write_validation() {
        let mut r = RemoteSlave::new();
        assert_eq!(
            r.write(Channel::DI1, HIGH),
            Err(CommandError::UnsupportedChannel(Channel::DI1))
        );
        assert_eq!(
            r.write(Channel::DO5, HIGH),
            Err(CommandError::UnsupportedChannel(Channel::DO5))
        );
        assert_eq!(
            r.write(Channel::DO1, 0.5),
            Err(CommandError::OutOfRange(Channel::DO1))
        );
        assert_eq!(
            r.write(Channel::AO1, 10.5),
            Err(CommandError::OutOfRange(Channel::AO1))
        );
        assert_eq!(r.take_command(), None);
    }

    #[test]
    fn test_write_builds_command() {
        let mut r = RemoteSlave::new();
        r.write(Channel::DO1, HIGH).unwrap();
        r.write(Channel::DO4, LOW).unwrap();
        r.write(Channel::AO1, 7.5).unwrap();

        let cmd = r.take_command().unwrap();
        assert_eq!(cmd.to_bytes(), [0b1_0011, 0b1000, 0x1D, 0x4C]);
        assert_eq!(r.take_command(), None);
    }

    #[test]
    fn test_command_confirmation() {
        let mut r = RemoteSlave::new();
        r.update_state(&state());
        r.write(Channel::DO2, HIGH).unwrap();
        assert!(!r.command_confirmed());

        let mut applied = state();
        applied.dos |= 0b0100;
        r.update_state(&applied);
        assert!(r.command_confirmed());

        // Confirmed writes are not resent.
        r.write(Channel::DO3, LOW).unwrap();
        assert_eq!(r.take_command().map(|c| c.mask), Some(0b0_0100));
    }
}
