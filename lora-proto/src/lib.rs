//! Iono LoRa network frames and slave adapters.
//!
//! This crate provides the compact binary frames an Iono board exchanges
//! with a LoRa master, and the glue between those frames and the
//! [`iono_core`] engine. Radio access and addressing live in the firmware;
//! everything here is chip-agnostic and testable on host.
//!
//! # Features
//!
//! - Fixed-size [`StateFrame`] and [`CommandFrame`] encoding
//! - [`LocalSlave`]: engine listener that builds state frames with
//!   per-input report throttling and rising-edge counters
//! - [`RemoteSlave`]: master-side mirror that decodes state frames and
//!   queues validated output writes
//!
//! # Example
//!
//! ```ignore
//! use iono_core::{Channel, Engine};
//! use lora_proto::{CommandFrame, LocalSlave};
//!
//! let mut engine = Engine::new(sampler, clock, LocalSlave::new(clock));
//! engine.subscribe_digital(Channel::DI1, 50);
//!
//! loop {
//!     engine.process();
//!     if let Some(state) = engine.listener_mut().take_state() {
//!         radio.send(&state.to_bytes());
//!     }
//!     if let Some(bytes) = radio.receive() {
//!         if let Ok(cmd) = CommandFrame::from_bytes(bytes) {
//!             cmd.apply(engine.sampler_mut());
//!         }
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod frame;
pub mod local;
pub mod remote;

pub use frame::{
    from_milli, to_milli, CommandFrame, FrameError, StateFrame, COMMAND_FRAME_LEN, FRAME_OUTPUTS,
    STATE_FRAME_LEN, UNKNOWN,
};
pub use local::LocalSlave;
pub use remote::{CommandError, RemoteSlave, AO1_MAX};
