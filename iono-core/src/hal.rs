//! Hardware and clock traits.

/// Electrical configuration of a physical pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input, no pulls.
    Input,
    InputPullUp,
    InputPullDown,
    Output,
}

/// Raw access to the board's physical pins, addressed by pin number.
///
/// This trait is the only place where the core touches hardware, allowing
/// the sampler and engine to run unchanged on any chip or on host mocks.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait IoPins {
    /// Configure a pin's direction and pulls.
    fn set_mode(&mut self, pin: u8, mode: PinMode);

    /// Read the logic level of a pin.
    ///
    /// For pins configured as outputs this returns the driven level.
    fn digital_read(&mut self, pin: u8) -> bool;

    /// Drive an output pin high or low.
    fn digital_write(&mut self, pin: u8, high: bool);

    /// Take one ADC conversion, in raw counts.
    fn analog_read(&mut self, pin: u8) -> u16;

    /// Set the DAC/PWM output of a pin, in raw counts.
    fn analog_write(&mut self, pin: u8, raw: u32);
}

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
