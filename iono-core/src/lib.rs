//! Platform-agnostic hardware abstraction for Iono I/O boards.
//!
//! This crate provides the logical channel model of an Iono board and the
//! polling machinery on top of it, without any chip-specific dependencies.
//! It can be used both in embedded `no_std` firmware and on host for testing.
//!
//! # Overview
//!
//! - [`channel`]: Logical channel identifiers ([`Channel`], [`ChannelKind`])
//! - [`board`]: Physical pin tables and converter ranges ([`BoardConfig`])
//! - [`hal`]: Pin and clock traits ([`IoPins`], [`Clock`])
//! - [`sampler`]: Calibrated reads and writes ([`Sampler`])
//! - [`engine`]: Debounce, change reporting and DI/DO links ([`Engine`])
//! - [`link`]: Output policies for linked inputs ([`LinkMode`])
//! - [`rs485`]: Transceiver transmit-enable line ([`TxEnable`])
//!
//! # Example
//!
//! ```rust,ignore
//! use iono_core::{BoardConfig, Channel, Engine, LinkMode, Sampler};
//!
//! let sampler = Sampler::new(pins, BoardConfig::IONO_RP);
//! let mut engine = Engine::new(sampler, clock, |ch: Channel, v: f32| {
//!     // report the transition
//! });
//! engine.setup();
//! engine.subscribe_digital(Channel::DI1, 50);
//! engine.link_di_do(Channel::DI2, Channel::DO2, LinkMode::ToggleOnHigh, 50);
//!
//! loop {
//!     engine.process();
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through defmt and derive `defmt::Format` (for embedded targets)
//! - **`log`**: Log through the `log` facade instead
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This must go first, so the logging macros are visible to the other modules.
pub(crate) mod fmt;

pub mod board;
pub mod channel;
pub mod engine;
pub mod hal;
pub mod link;
pub mod rs485;
pub mod sampler;

#[cfg(test)]
mod mock;

// Re-export main types at crate root
pub use board::{BoardConfig, TxEnableLine};
pub use channel::{Channel, ChannelError, ChannelKind, InputMode, CHANNEL_COUNT};
pub use engine::{ChannelListener, Engine, NullListener};
pub use hal::{Clock, IoPins, PinMode};
pub use link::LinkMode;
pub use rs485::TxEnable;
pub use sampler::{level_of, Sampler, HIGH, LOW};
