//! Input-to-output link policies.

use core::fmt;

use crate::channel::{Channel, ChannelError};
use crate::hal::IoPins;
use crate::sampler::{Sampler, HIGH, LOW};

/// How a committed input transition drives its linked output.
///
/// The numeric codes are the ones used by configuration consoles and
/// persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LinkMode {
    /// Output copies the input level.
    Follow = 1,
    /// Output takes the opposite level.
    Invert = 2,
    /// Output toggles on every transition.
    ToggleAlways = 3,
    /// Output toggles when the input goes HIGH.
    ToggleOnHigh = 4,
    /// Output toggles when the input goes LOW.
    ToggleOnLow = 5,
}

impl LinkMode {
    /// Drive `output` for a committed input `value`.
    pub fn apply<P: IoPins>(self, value: f32, output: Channel, sampler: &mut Sampler<P>) {
        match self {
            LinkMode::Follow => sampler.write(output, value),
            LinkMode::Invert => sampler.write(output, if value == HIGH { LOW } else { HIGH }),
            LinkMode::ToggleAlways => sampler.flip(output),
            LinkMode::ToggleOnHigh => {
                if value == HIGH {
                    sampler.flip(output);
                }
            }
            LinkMode::ToggleOnLow => {
                if value == LOW {
                    sampler.flip(output);
                }
            }
        }
    }

    /// Numeric code of the mode.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LinkMode {
    type Error = ChannelError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            1 => LinkMode::Follow,
            2 => LinkMode::Invert,
            3 => LinkMode::ToggleAlways,
            4 => LinkMode::ToggleOnHigh,
            5 => LinkMode::ToggleOnLow,
            _ => return Err(ChannelError::UnknownLinkMode(code)),
        })
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkMode::Follow => "follow",
            LinkMode::Invert => "invert",
            LinkMode::ToggleAlways => "toggle",
            LinkMode::ToggleOnHigh => "toggle-on-high",
            LinkMode::ToggleOnLow => "toggle-on-low",
        })
    }
}
