//! Hand-off of committed transitions from the engine task to the report task.

use defmt::warn;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel as Queue;
use iono_core::{Channel, ChannelListener, Clock};
use portable_atomic::{AtomicU32, Ordering};

use crate::clock::EmbassyClock;

/// Queue depth; one polling tick produces at most 13 transitions.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// A committed channel transition.
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub struct ChannelEvent {
    pub channel: Channel,
    pub value: f32,
    /// Commit time, milliseconds since boot.
    pub at_ms: u64,
}

pub type EventQueue = Queue<CriticalSectionRawMutex, ChannelEvent, EVENT_QUEUE_DEPTH>;

static DROPPED: AtomicU32 = AtomicU32::new(0);

/// Number of transitions lost because the queue was full.
pub fn dropped_events() -> u32 {
    DROPPED.load(Ordering::Relaxed)
}

/// Engine listener that pushes transitions onto an [`EventQueue`].
///
/// Never blocks the engine: when the consumer falls behind, the newest
/// transition is dropped and counted.
pub struct EventForwarder {
    queue: &'static EventQueue,
    clock: EmbassyClock,
}

impl EventForwarder {
    pub fn new(queue: &'static EventQueue) -> Self {
        Self {
            queue,
            clock: EmbassyClock,
        }
    }
}

impl ChannelListener for EventForwarder {
    fn on_change(&mut self, channel: Channel, value: f32) {
        let event = ChannelEvent {
            channel,
            value,
            at_ms: self.clock.now_ms(),
        };
        if self.queue.try_send(event).is_err() {
            let dropped = DROPPED.fetch_add(1, Ordering::Relaxed) + 1;
            warn!("event queue full, dropped {} ({} total)", channel, dropped);
        }
    }
}
