//! Iono RP firmware support for RP2040.
//!
//! This crate binds the platform-agnostic [`iono_core`] engine to the
//! RP2040 peripherals of the Iono RP board.
//!
//! # Overview
//!
//! The firmware polls every monitored channel once per millisecond,
//! debounces transitions, drives the configured DI/DO links locally, and
//! reports committed transitions over defmt (and, with `rs485-state`, as
//! state frames on the RS-485 port).
//!
//! # Hardware Configuration
//!
//! | Function      | GPIO        | Description |
//! |---------------|-------------|-------------|
//! | DO1..DO4      | 13,12,11,10 | Relay outputs |
//! | DI1..DI4      | 26..29      | Tri-mode inputs (ADC0..ADC3) |
//! | DI5, DI6      | 24, 23      | Digital inputs |
//! | DI5/DI6 bypass| 7, 6        | Direct inputs bypassing the filter |
//! | AO1           | 8           | 0-10 V output (PWM slice 4A, 1 kHz) |
//! | RS-485 TX     | 16          | UART0 transmit |
//! | RS-485 TXEN   | 25          | Transmit enable, active low |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with two tasks:
//!
//! - **Engine Task**: Runs [`Engine::process`](iono_core::Engine::process)
//!   on a ticker and forwards transitions to an [`EventQueue`]
//! - **Report Task**: Logs transitions and publishes state frames
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`rs485-state`** (default): Publish [`lora_proto::StateFrame`]s on RS-485

#![no_std]

pub use iono_core::{BoardConfig, Channel, Engine, LinkMode, Sampler};

pub mod clock;
pub mod config;
pub mod events;
pub mod pins;
#[cfg(feature = "rs485-state")]
pub mod rs485;

pub use clock::EmbassyClock;
pub use events::{dropped_events, ChannelEvent, EventForwarder, EventQueue};
pub use pins::RpPins;
#[cfg(feature = "rs485-state")]
pub use rs485::{StatePublisher, RS485_BAUDRATE};

/// Engine type running on the board.
pub type BoardEngine = Engine<RpPins<'static>, EmbassyClock, EventForwarder>;
