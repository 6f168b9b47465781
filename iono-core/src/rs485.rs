//! RS-485 transceiver transmit-enable line.

use embedded_hal::digital::OutputPin;

use crate::board::TxEnableLine;

/// Drives the driver-enable input of the board's RS-485 transceiver.
///
/// Serial adapters assert the line for the duration of a transmission and
/// release it afterwards so the bus returns to receive.
pub struct TxEnable<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> TxEnable<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Wrap `pin` with the polarity of the board's line.
    pub fn for_line(pin: P, line: TxEnableLine) -> Self {
        Self::new(pin, line.active_low)
    }

    /// Assert (`true`) or release (`false`) the transmitter.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), P::Error> {
        if enabled != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }

    /// Decompose into the underlying pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct Line {
        high: Option<bool>,
    }

    impl ErrorType for Line {
        type Error = Infallible;
    }

    impl OutputPin for Line {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = Some(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = Some(true);
            Ok(())
        }
    }

    #[test]
    fn test_active_high_line() {
        let mut tx = TxEnable::new(Line::default(), false);
        tx.set_enabled(true).unwrap();
        assert_eq!(tx.pin.high, Some(true));
        tx.set_enabled(false).unwrap();
        assert_eq!(tx.pin.high, Some(false));
    }

    #[test]
    fn test_active_low_line() {
        let line = TxEnableLine {
            pin: 25,
            active_low: true,
        };
        let mut tx = TxEnable::for_line(Line::default(), line);
        tx.set_enabled(true).unwrap();
        assert_eq!(tx.pin.high, Some(false));
        tx.set_enabled(false).unwrap();
        assert_eq!(tx.into_inner().high, Some(true));
    }
}
