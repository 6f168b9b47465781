//! [`IoPins`] over the RP2040 peripherals wired to the Iono RP terminals.

use defmt::warn;
use embassy_rp::adc::{Adc, Blocking, Channel as AdcChannel};
use embassy_rp::gpio::{Flex, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed_macro::fixed;
use iono_core::{BoardConfig, Channel, IoPins, PinMode};

/// GPIOs of DO1..DO4.
pub const DO_PINS: [u8; 4] = [13, 12, 11, 10];
/// GPIOs (ADC0..ADC3) of input groups 1..4.
pub const DI_PINS: [u8; 4] = [26, 27, 28, 29];
/// GPIOs of DI5, DI6 and their bypass pins.
pub const FLEX_PINS: [u8; 4] = [24, 23, 7, 6];
/// GPIO of AO1 (PWM slice 4, channel A).
pub const AO1_PIN: u8 = 8;

const _: () = {
    let pins = BoardConfig::IONO_RP.pins;
    assert!(matches!(pins[Channel::DO1 as usize], Some(13)));
    assert!(matches!(pins[Channel::DO4 as usize], Some(10)));
    assert!(matches!(pins[Channel::DI1 as usize], Some(26)));
    assert!(matches!(pins[Channel::DI5 as usize], Some(24)));
    assert!(matches!(pins[Channel::AO1 as usize], Some(8)));
    assert!(BoardConfig::IONO_RP.di5_bypass == 7);
};

/// ADC count above which a tri-mode input reads as HIGH.
const DIGITAL_THRESHOLD: u16 = 2048;

/// PWM configuration for AO1: full 16-bit period at roughly 1 kHz.
fn ao1_config() -> PwmConfig {
    let mut config = PwmConfig::default();
    config.top = u16::MAX;
    // 125 MHz / (65536 * 1.9) ~= 1 kHz
    config.divider = fixed!(1.9: U12F4);
    config.compare_a = 0;
    config
}

/// Pin driver for the Iono RP.
///
/// Tri-mode inputs are permanently attached to the ADC; their digital
/// level is derived from the conversion result.
pub struct RpPins<'d> {
    outputs: [Output<'d>; 4],
    flex: [Flex<'d>; 4],
    adc: Adc<'d, Blocking>,
    inputs: [AdcChannel<'d>; 4],
    ao1: Pwm<'d>,
    ao1_config: PwmConfig,
}

impl<'d> RpPins<'d> {
    /// Take ownership of the board's I/O.
    ///
    /// Arrays are in the order of [`DO_PINS`], [`FLEX_PINS`] and [`DI_PINS`].
    pub fn new(
        outputs: [Output<'d>; 4],
        flex: [Flex<'d>; 4],
        adc: Adc<'d, Blocking>,
        inputs: [AdcChannel<'d>; 4],
        mut ao1: Pwm<'d>,
    ) -> Self {
        let ao1_config = ao1_config();
        ao1.set_config(&ao1_config);
        Self {
            outputs,
            flex,
            adc,
            inputs,
            ao1,
            ao1_config,
        }
    }

    fn position(table: &[u8], pin: u8) -> Option<usize> {
        table.iter().position(|p| *p == pin)
    }

    fn convert(&mut self, index: usize) -> u16 {
        match self.adc.blocking_read(&mut self.inputs[index]) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("ADC{} conversion failed: {:?}", index, e);
                0
            }
        }
    }
}

impl IoPins for RpPins<'_> {
    fn set_mode(&mut self, pin: u8, mode: PinMode) {
        let Some(i) = Self::position(&FLEX_PINS, pin) else {
            // Relay outputs, ADC inputs and AO1 have fixed functions.
            return;
        };
        let flex = &mut self.flex[i];
        match mode {
            PinMode::Output => flex.set_as_output(),
            PinMode::Input | PinMode::InputPullUp | PinMode::InputPullDown => {
                flex.set_as_input();
                flex.set_pull(match mode {
                    PinMode::InputPullUp => Pull::Up,
                    PinMode::InputPullDown => Pull::Down,
                    _ => Pull::None,
                });
            }
        }
    }

    fn digital_read(&mut self, pin: u8) -> bool {
        if let Some(i) = Self::position(&DO_PINS, pin) {
            return self.outputs[i].is_set_high();
        }
        if let Some(i) = Self::position(&FLEX_PINS, pin) {
            return self.flex[i].is_high();
        }
        if let Some(i) = Self::position(&DI_PINS, pin) {
            return self.convert(i) >= DIGITAL_THRESHOLD;
        }
        false
    }

    fn digital_write(&mut self, pin: u8, high: bool) {
        if let Some(i) = Self::position(&DO_PINS, pin) {
            self.outputs[i].set_level(Level::from(high));
        } else if let Some(i) = Self::position(&FLEX_PINS, pin) {
            self.flex[i].set_level(Level::from(high));
        }
    }

    fn analog_read(&mut self, pin: u8) -> u16 {
        match Self::position(&DI_PINS, pin) {
            Some(i) => self.convert(i),
            None => 0,
        }
    }

    fn analog_write(&mut self, pin: u8, raw: u32) {
        if pin != AO1_PIN {
            return;
        }
        self.ao1_config.compare_a = u16::try_from(raw).unwrap_or(u16::MAX);
        self.ao1.set_config(&self.ao1_config);
    }
}
