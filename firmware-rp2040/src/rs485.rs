//! State frame publishing on the RS-485 port.

use core::convert::Infallible;

use embassy_rp::uart::{Blocking, Error as UartError, UartTx};
use embedded_hal::digital::OutputPin;
use iono_core::{ChannelListener, TxEnable};
use lora_proto::{LocalSlave, StateFrame};

use crate::clock::EmbassyClock;
use crate::events::ChannelEvent;

/// Default RS-485 baud rate, 8N1.
pub const RS485_BAUDRATE: u32 = 9600;

/// Folds transitions into a [`StateFrame`] and sends it on the bus.
pub struct StatePublisher<'d, E> {
    tx: UartTx<'d, Blocking>,
    enable: TxEnable<E>,
    slave: LocalSlave<EmbassyClock>,
}

impl<'d, E: OutputPin<Error = Infallible>> StatePublisher<'d, E> {
    /// Create a publisher with the transmitter released.
    pub fn new(tx: UartTx<'d, Blocking>, mut enable: TxEnable<E>) -> Self {
        enable.set_enabled(false).unwrap_or_else(|e| match e {});
        Self {
            tx,
            enable,
            slave: LocalSlave::new(EmbassyClock),
        }
    }

    /// Get a mutable reference to the state builder.
    pub fn slave_mut(&mut self) -> &mut LocalSlave<EmbassyClock> {
        &mut self.slave
    }

    pub fn record(&mut self, event: &ChannelEvent) {
        self.slave.on_change(event.channel, event.value);
    }

    /// Send the state if it changed since the last transmission.
    pub fn publish_changes(&mut self) -> Result<(), UartError> {
        match self.slave.take_state() {
            Some(state) => self.send(&state),
            None => Ok(()),
        }
    }

    /// Send the current state unconditionally.
    pub fn publish(&mut self) -> Result<(), UartError> {
        let state = *self.slave.state();
        self.send(&state)
    }

    fn send(&mut self, state: &StateFrame) -> Result<(), UartError> {
        self.enable.set_enabled(true).unwrap_or_else(|e| match e {});
        let result = self
            .tx
            .blocking_write(&state.to_bytes())
            .and_then(|()| self.tx.blocking_flush());
        self.enable.set_enabled(false).unwrap_or_else(|e| match e {});
        result
    }
}
