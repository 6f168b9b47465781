//! Build-time configuration of the firmware.

use embassy_time::Duration;
use iono_core::{Channel, LinkMode};

/// Polling period of the engine.
pub const POLL_PERIOD: Duration = Duration::from_millis(1);

/// Stable time for digital channels, milliseconds.
pub const DEBOUNCE_MS: u64 = 50;

/// Stable time for analog channels, milliseconds.
pub const ANALOG_STABLE_MS: u64 = 200;

/// Smallest analog change worth reporting, in volts or milliamps.
pub const ANALOG_MIN_VARIATION: f32 = 0.1;

/// Inputs reported as digital levels.
pub const DIGITAL_SUBSCRIPTIONS: [Channel; 4] =
    [Channel::DI3, Channel::DI4, Channel::DI5, Channel::DI6];

/// Inputs and outputs reported as analog values.
pub const ANALOG_SUBSCRIPTIONS: [Channel; 1] = [Channel::AO1];

/// Outputs reported on every change.
pub const OUTPUT_SUBSCRIPTIONS: [Channel; 4] =
    [Channel::DO1, Channel::DO2, Channel::DO3, Channel::DO4];

/// Local input-to-relay links.
pub const LINKS: [(Channel, Channel, LinkMode); 2] = [
    (Channel::DI1, Channel::DO1, LinkMode::Follow),
    (Channel::DI2, Channel::DO2, LinkMode::ToggleOnHigh),
];

/// Interval at which the full state is resent even without changes.
#[cfg(feature = "rs485-state")]
pub const STATE_HEARTBEAT: Duration = Duration::from_secs(10);
