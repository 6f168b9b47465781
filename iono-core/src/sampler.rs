//! Channel sampler: converts between raw pin signals and engineering units.
//!
//! Digital channels read and write as `0.0`/`1.0`. Voltage inputs read in
//! volts, current inputs in milliamps, and the analog output is written in
//! volts and read back from the last written value.

use crate::board::BoardConfig;
use crate::channel::{Channel, ChannelKind, CHANNEL_COUNT};
use crate::hal::{IoPins, PinMode};

/// Logic HIGH as a channel value.
pub const HIGH: f32 = 1.0;
/// Logic LOW as a channel value.
pub const LOW: f32 = 0.0;

/// Level a value drives on a digital output: HIGH unless it truncates to zero.
#[inline]
#[must_use]
pub fn level_of(value: f32) -> bool {
    value as i32 != 0
}

#[inline]
fn to_value(high: bool) -> f32 {
    if high {
        HIGH
    } else {
        LOW
    }
}

/// Reads and writes logical channels through a board's pin table.
pub struct Sampler<P> {
    pins: P,
    board: BoardConfig,
    /// Pin table in effect; differs from `board.pins` while DI5/DI6 are bypassed.
    bindings: [Option<u8>; CHANNEL_COUNT],
    /// Last value written to AO1, in volts.
    ao1: f32,
}

impl<P: IoPins> Sampler<P> {
    /// Create a sampler for the given board layout.
    ///
    /// No hardware is touched until [`setup`](Self::setup) is called.
    pub fn new(pins: P, board: BoardConfig) -> Self {
        Self {
            pins,
            bindings: board.pins,
            board,
            ao1: 0.0,
        }
    }

    /// Configure pin directions and drive AO1 to zero.
    pub fn setup(&mut self) {
        for ch in Channel::DIGITAL_OUTPUTS {
            if let Some(pin) = self.pin(ch) {
                self.pins.set_mode(pin, PinMode::Output);
            }
        }
        for ch in Channel::DIGITAL_INPUTS {
            if let Some(pin) = self.pin(ch) {
                self.pins.set_mode(pin, PinMode::Input);
            }
        }
        info!("{} I/O configured", self.board.name);
        self.write(Channel::AO1, 0.0);
    }

    /// Read the calibrated value of a channel.
    ///
    /// Returns `None` if the board has no terminal for this channel.
    pub fn read(&mut self, channel: Channel) -> Option<f32> {
        let pin = self.pin(channel)?;
        Some(match channel.kind() {
            ChannelKind::DigitalOutput | ChannelKind::DigitalInput => {
                to_value(self.pins.digital_read(pin))
            }
            ChannelKind::AnalogVoltage | ChannelKind::AnalogCurrent => {
                let raw = u32::from(self.pins.analog_read(pin));
                self.scale(channel, raw)
            }
            ChannelKind::AnalogOutput => self.ao1,
        })
    }

    /// Read an analog input as the mean of `n` back-to-back conversions.
    ///
    /// Only voltage and current inputs are accepted. The raw counts are
    /// averaged with integer division before scaling.
    pub fn read_averaged(&mut self, channel: Channel, n: u16) -> Option<f32> {
        if !channel.is_analog_input() || n == 0 {
            return None;
        }
        let pin = self.pin(channel)?;
        let sum: u32 = (0..n)
            .map(|_| u32::from(self.pins.analog_read(pin)))
            .sum();
        Some(self.scale(channel, sum / u32::from(n)))
    }

    /// Write a value to an output channel.
    ///
    /// Digital outputs go HIGH for any value that truncates to non-zero.
    /// AO1 is clamped to `[0, ao_max]`. Inputs are ignored.
    pub fn write(&mut self, channel: Channel, value: f32) {
        let Some(pin) = self.pin(channel) else {
            return;
        };
        match channel.kind() {
            ChannelKind::DigitalOutput => self.pins.digital_write(pin, level_of(value)),
            ChannelKind::AnalogOutput => {
                let ao_max = self.board.ao_max;
                let value = value.clamp(0.0, ao_max);
                let raw = (value * self.board.dac_max() as f32 / ao_max) as u32;
                self.pins.analog_write(pin, raw);
                self.ao1 = value;
            }
            _ => {}
        }
    }

    /// Invert the level of a digital channel.
    pub fn flip(&mut self, channel: Channel) {
        if let Some(value) = self.read(channel) {
            self.write(channel, if value == HIGH { LOW } else { HIGH });
        }
    }

    /// Rebind DI5 or DI6 between its normal and bypass pin.
    ///
    /// `Some(mode)` moves the channel to its bypass pin with that mode;
    /// `None` returns it to its normal pin as a floating input. Other
    /// channels are left untouched.
    pub fn set_bypass(&mut self, channel: Channel, mode: Option<PinMode>) {
        let bypass = match channel {
            Channel::DI5 => self.board.di5_bypass,
            Channel::DI6 => self.board.di6_bypass,
            _ => {
                warn!("bypass not available on {}", channel);
                return;
            }
        };
        let (pin, mode) = match mode {
            Some(mode) => (Some(bypass), mode),
            None => (self.board.pin(channel), PinMode::Input),
        };
        if let Some(pin) = pin {
            self.pins.set_mode(pin, mode);
            debug!("{} bound to pin {}", channel, pin);
        }
        self.bindings[usize::from(channel.index())] = pin;
    }

    /// Physical pin currently bound to `channel`.
    #[inline]
    #[must_use]
    pub fn pin(&self, channel: Channel) -> Option<u8> {
        self.bindings[usize::from(channel.index())]
    }

    /// Board layout the sampler was created with.
    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    /// Get a reference to the pin driver.
    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Get a mutable reference to the pin driver.
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Decompose the sampler into its pin driver.
    pub fn into_pins(self) -> P {
        self.pins
    }

    fn scale(&self, channel: Channel, raw: u32) -> f32 {
        let full_scale = self.board.full_scale(channel).unwrap_or(0.0);
        raw as f32 * full_scale / self.board.raw_max() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPins;

    fn sampler(board: BoardConfig) -> Sampler<MockPins> {
        let mut sampler = Sampler::new(MockPins::new(), board);
        sampler.setup();
        sampler
    }

    #[test]
    fn test_setup_configures_pins_and_zeroes_ao1() {
        let s = sampler(BoardConfig::IONO_RP);
        assert_eq!(s.pins().mode(13), Some(PinMode::Output));
        assert_eq!(s.pins().mode(26), Some(PinMode::Input));
        assert_eq!(s.pins().mode(24), Some(PinMode::Input));
        assert_eq!(s.pins().analog_out(8), Some(0));
    }

    #[test]
    fn test_voltage_scaling_12_bit() {
        let board = BoardConfig {
            av_max: 10.0,
            adc_bits: 12,
            ..BoardConfig::IONO_RP
        };
        let mut s = sampler(board);
        s.pins_mut().set_analog(26, 2048);

        let v = s.read(Channel::AV1).unwrap();
        assert!((v - 2048.0 * 10.0 / 4095.0).abs() < 1e-4);
        assert!((v - 5.0012).abs() < 1e-3);
    }

    #[test]
    fn test_current_scaling_uses_ai_max() {
        let mut s = sampler(BoardConfig::IONO_MKR);
        s.pins_mut().set_analog(17, 4095);
        assert_eq!(s.read(Channel::AI2), Some(25.0));
        assert_eq!(s.read(Channel::AV2), Some(30.0));
    }

    #[test]
    fn test_digital_read_write() {
        let mut s = sampler(BoardConfig::IONO_RP);
        s.pins_mut().set_digital(27, true);
        assert_eq!(s.read(Channel::DI2), Some(HIGH));

        s.write(Channel::DO1, 1.0);
        assert_eq!(s.read(Channel::DO1), Some(HIGH));
        s.write(Channel::DO1, 0.4);
        assert_eq!(s.read(Channel::DO1), Some(LOW));
    }

    #[test]
    fn test_write_to_input_is_ignored() {
        let mut s = sampler(BoardConfig::IONO_RP);
        s.write(Channel::DI1, 1.0);
        s.write(Channel::AV1, 5.0);
        assert_eq!(s.pins().digital_writes(), 0);
    }

    #[test]
    fn test_unbound_channel_reads_none() {
        let mut s = sampler(BoardConfig::IONO_RP);
        assert_eq!(s.read(Channel::DO5), None);
        s.write(Channel::DO5, 1.0);
        assert_eq!(s.pins().digital_writes(), 0);
    }

    #[test]
    fn test_ao1_clamped_and_cached() {
        let mut s = sampler(BoardConfig::IONO_RP);
        s.write(Channel::AO1, 15.0);
        assert_eq!(s.read(Channel::AO1), Some(10.0));
        assert_eq!(s.pins().analog_out(8), Some(65535));

        s.write(Channel::AO1, -3.0);
        assert_eq!(s.read(Channel::AO1), Some(0.0));
        assert_eq!(s.pins().analog_out(8), Some(0));

        s.write(Channel::AO1, 5.0);
        assert_eq!(s.read(Channel::AO1), Some(5.0));
        assert_eq!(s.pins().analog_out(8), Some(32767));
    }

    #[test]
    fn test_flip_digital_output() {
        let mut s = sampler(BoardConfig::IONO_RP);
        s.flip(Channel::DO2);
        assert_eq!(s.read(Channel::DO2), Some(HIGH));
        s.flip(Channel::DO2);
        assert_eq!(s.read(Channel::DO2), Some(LOW));
    }

    #[test]
    fn test_read_averaged() {
        let mut s = sampler(BoardConfig::IONO_RP);
        s.pins_mut().queue_analog(28, &[100, 200, 300, 401]);
        let v = s.read_averaged(Channel::AV3, 4).unwrap();
        // Integer mean of 1001 / 4 = 250 counts.
        assert!((v - 250.0 * 30.0 / 4095.0).abs() < 1e-4);
    }

    #[test]
    fn test_read_averaged_rejects_non_analog_inputs() {
        let mut s = sampler(BoardConfig::IONO_RP);
        assert_eq!(s.read_averaged(Channel::DI1, 8), None);
        assert_eq!(s.read_averaged(Channel::AO1, 8), None);
        assert_eq!(s.read_averaged(Channel::AV1, 0), None);
    }

    #[test]
    fn test_bypass_rebinds_di5() {
        let mut s = sampler(BoardConfig::IONO_RP);
        s.pins_mut().set_digital(7, true);
        assert_eq!(s.read(Channel::DI5), Some(LOW));

        s.set_bypass(Channel::DI5, Some(PinMode::InputPullUp));
        assert_eq!(s.pin(Channel::DI5), Some(7));
        assert_eq!(s.pins().mode(7), Some(PinMode::InputPullUp));
        assert_eq!(s.read(Channel::DI5), Some(HIGH));

        s.set_bypass(Channel::DI5, None);
        assert_eq!(s.pin(Channel::DI5), Some(24));
        assert_eq!(s.read(Channel::DI5), Some(LOW));
    }

    #[test]
    fn test_bypass_ignored_on_other_channels() {
        let mut s = sampler(BoardConfig::IONO_RP);
        s.set_bypass(Channel::DI1, Some(PinMode::InputPullUp));
        assert_eq!(s.pin(Channel::DI1), Some(26));
    }
}
