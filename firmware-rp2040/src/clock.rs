//! [`Clock`] backed by the embassy time driver.

use embassy_time::Instant;
use iono_core::Clock;

/// Milliseconds since boot.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
