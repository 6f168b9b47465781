//! Slave-side adapter: folds engine transitions into the next state frame.

use iono_core::{Channel, ChannelKind, ChannelListener, Clock, HIGH};

use crate::frame::{di_bit, do_bit, set_bit, to_milli, StateFrame};

/// Per-terminal rate limit for input reports.
#[derive(Debug, Clone, Copy, Default)]
struct Throttle {
    min_interval_ms: u64,
    last_report: Option<u64>,
}

impl Throttle {
    fn admit(&mut self, now: u64) -> bool {
        let due = match self.last_report {
            Some(last) => now.saturating_sub(last) >= self.min_interval_ms,
            None => true,
        };
        if due {
            self.last_report = Some(now);
        }
        due
    }
}

/// Input terminal 0..6 of a channel: groups 1..4 then DI5, DI6.
fn terminal(channel: Channel) -> Option<usize> {
    match channel {
        Channel::DI5 => Some(4),
        Channel::DI6 => Some(5),
        _ => channel.group().map(|g| usize::from(g - 1)),
    }
}

/// State publisher for a board acting as a LoRa slave.
///
/// Install it as the engine's [`ChannelListener`] and subscribe the channels
/// to report. Outputs are reported on every change; inputs at most once per
/// configured interval.
pub struct LocalSlave<C> {
    clock: C,
    state: StateFrame,
    changed: bool,
    throttles: [Throttle; 6],
}

impl<C: Clock> LocalSlave<C> {
    /// Create a publisher with an unknown state pending transmission.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: StateFrame::new(),
            changed: true,
            throttles: [Throttle::default(); 6],
        }
    }

    /// Limit how often the input terminal of `channel` is reported.
    ///
    /// Any of DIn/AVn/AIn selects input group n. Other channels are ignored.
    pub fn set_update_interval(&mut self, channel: Channel, secs: u32) {
        if let Some(t) = terminal(channel) {
            self.throttles[t].min_interval_ms = u64::from(secs) * 1000;
        }
    }

    /// Current state, whether or not it has been taken.
    pub fn state(&self) -> &StateFrame {
        &self.state
    }

    /// Take the state for transmission if it changed since the last take.
    pub fn take_state(&mut self) -> Option<StateFrame> {
        if core::mem::take(&mut self.changed) {
            Some(self.state)
        } else {
            None
        }
    }

    fn record_mode(&mut self, channel: Channel) {
        let Some(group) = channel.group() else {
            return;
        };
        let digital = channel.kind() == ChannelKind::DigitalInput;
        let current = channel.kind() == ChannelKind::AnalogCurrent;
        set_bit(&mut self.state.modes, 9 - 2 * group, digital);
        set_bit(&mut self.state.modes, 8 - 2 * group, current);
    }
}

impl<C: Clock> ChannelListener for LocalSlave<C> {
    fn on_change(&mut self, channel: Channel, value: f32) {
        if let Some(b) = do_bit(channel) {
            set_bit(&mut self.state.dos, b, value == HIGH);
            self.changed = true;
            return;
        }
        if channel == Channel::AO1 {
            self.state.ao1 = to_milli(value);
            self.changed = true;
            return;
        }
        let Some(t) = terminal(channel) else {
            return;
        };

        self.record_mode(channel);
        let now = self.clock.now_ms();
        if !self.throttles[t].admit(now) {
            return;
        }

        if let Some(b) = di_bit(channel) {
            let high = value == HIGH;
            set_bit(&mut self.state.dis, b, high);
            if high {
                self.state.counters[t] = self.state.counters[t].wrapping_add(1);
            }
        } else {
            self.state.analog[t] = to_milli(value);
        }
        self.changed = true;
    }
}
