//! Board variant configuration: physical pin table and unit scaling.
//!
//! Each Iono board family wires the same logical channels to different
//! physical pins and uses converters of different resolution and range.
//! [`BoardConfig`] captures one variant; the presets below describe the
//! boards that ship today.

use crate::channel::{Channel, ChannelKind, CHANNEL_COUNT};

/// RS-485 transmit-enable line of a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxEnableLine {
    pub pin: u8,
    /// Line is asserted by driving it low.
    pub active_low: bool,
}

/// Physical layout and converter parameters of a board variant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Variant name, for logs.
    pub name: &'static str,
    /// Physical pin per channel index; `None` where the variant has no terminal.
    pub pins: [Option<u8>; CHANNEL_COUNT],
    /// Alternate physical pin for DI5 in bypass mode.
    pub di5_bypass: u8,
    /// Alternate physical pin for DI6 in bypass mode.
    pub di6_bypass: u8,
    /// ADC resolution in bits.
    pub adc_bits: u8,
    /// DAC/PWM resolution in bits.
    pub dac_bits: u8,
    /// Voltage input full scale, volts.
    pub av_max: f32,
    /// Current input full scale, milliamps.
    pub ai_max: f32,
    /// Analog output full scale, volts.
    pub ao_max: f32,
    pub tx_enable: Option<TxEnableLine>,
}

/// Build a pin table from per-terminal pins.
///
/// Tri-mode inputs share one physical pin across their DI/AV/AI channels.
const fn pin_table(
    dos: [Option<u8>; 6],
    dis: [u8; 4],
    di5: u8,
    di6: u8,
    ao1: u8,
) -> [Option<u8>; CHANNEL_COUNT] {
    let mut pins = [None; CHANNEL_COUNT];
    let mut i = 0;
    while i < 6 {
        pins[i] = dos[i];
        i += 1;
    }
    let mut g = 0;
    while g < 4 {
        let base = Channel::DI1 as usize + g * 3;
        pins[base] = Some(dis[g]);
        pins[base + 1] = Some(dis[g]);
        pins[base + 2] = Some(dis[g]);
        g += 1;
    }
    pins[Channel::DI5 as usize] = Some(di5);
    pins[Channel::DI6 as usize] = Some(di6);
    pins[Channel::AO1 as usize] = Some(ao1);
    pins
}

impl BoardConfig {
    /// Iono Uno (AVR/SAMD): six relays, 10-bit ADC, 8-bit PWM output.
    pub const IONO_UNO: Self = Self {
        name: "Iono Uno",
        pins: pin_table(
            [Some(18), Some(19), Some(5), Some(6), Some(7), Some(8)],
            [14, 15, 16, 17],
            2,
            3,
            9,
        ),
        di5_bypass: 2,
        di6_bypass: 3,
        adc_bits: 10,
        dac_bits: 8,
        av_max: 10.0,
        ai_max: 20.0,
        ao_max: 10.0,
        tx_enable: None,
    };

    /// Iono MKR: four relays, 12-bit ADC, 10-bit DAC.
    pub const IONO_MKR: Self = Self {
        name: "Iono MKR",
        pins: pin_table(
            [Some(3), Some(2), Some(21), Some(20), None, None],
            [16, 17, 18, 19],
            7,
            5,
            15,
        ),
        di5_bypass: 0,
        di6_bypass: 1,
        adc_bits: 12,
        dac_bits: 10,
        av_max: 30.0,
        ai_max: 25.0,
        ao_max: 10.0,
        tx_enable: Some(TxEnableLine {
            pin: 4,
            active_low: false,
        }),
    };

    /// Iono RP (RP2040): four relays, 12-bit ADC, 16-bit PWM output.
    pub const IONO_RP: Self = Self {
        name: "Iono RP",
        pins: pin_table(
            [Some(13), Some(12), Some(11), Some(10), None, None],
            [26, 27, 28, 29],
            24,
            23,
            8,
        ),
        di5_bypass: 7,
        di6_bypass: 6,
        adc_bits: 12,
        dac_bits: 16,
        av_max: 30.0,
        ai_max: 25.0,
        ao_max: 10.0,
        tx_enable: Some(TxEnableLine {
            pin: 25,
            active_low: true,
        }),
    };

    /// Physical pin bound to `channel`, if the variant has one.
    #[inline]
    #[must_use]
    pub fn pin(&self, channel: Channel) -> Option<u8> {
        self.pins[usize::from(channel.index())]
    }

    /// Highest raw ADC count.
    #[inline]
    #[must_use]
    pub const fn raw_max(&self) -> u32 {
        (1u32 << self.adc_bits) - 1
    }

    /// Highest raw DAC count.
    #[inline]
    #[must_use]
    pub const fn dac_max(&self) -> u32 {
        (1u32 << self.dac_bits) - 1
    }

    /// Full-scale value of an analog channel; digital channels have none.
    #[must_use]
    pub fn full_scale(&self, channel: Channel) -> Option<f32> {
        match channel.kind() {
            ChannelKind::AnalogVoltage => Some(self.av_max),
            ChannelKind::AnalogCurrent => Some(self.ai_max),
            ChannelKind::AnalogOutput => Some(self.ao_max),
            ChannelKind::DigitalInput | ChannelKind::DigitalOutput => None,
        }
    }

    /// Number of digital outputs the variant populates.
    #[must_use]
    pub fn digital_output_count(&self) -> usize {
        Channel::DIGITAL_OUTPUTS
            .iter()
            .filter(|ch| self.pin(**ch).is_some())
            .count()
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::IONO_RP
    }
}
