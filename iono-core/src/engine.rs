//! Engine: debounced change detection and DI/DO linking over a [`Sampler`].
//!
//! The engine keeps one monitoring record per monitorable terminal and is
//! driven by calling [`Engine::process`] from the host's run loop. Each call
//! samples every active record once and, when a new value has settled,
//! notifies the [`ChannelListener`] and drives the linked output.

use crate::channel::{Channel, ChannelKind, InputMode};
use crate::hal::{Clock, IoPins};
use crate::link::LinkMode;
use crate::sampler::Sampler;

/// Receives committed channel transitions.
///
/// Called inline from [`Engine::process`]; implementations must return
/// promptly since they delay the remaining channels of the tick.
pub trait ChannelListener {
    fn on_change(&mut self, channel: Channel, value: f32);
}

impl<F: FnMut(Channel, f32)> ChannelListener for F {
    #[inline]
    fn on_change(&mut self, channel: Channel, value: f32) {
        self(channel, value)
    }
}

/// Listener that discards all transitions.
///
/// Use this when the engine only drives DI/DO links.
pub struct NullListener;

impl ChannelListener for NullListener {
    fn on_change(&mut self, _channel: Channel, _value: f32) {}
}

/// Number of monitoring records: DI1..DI6, DO1..DO6, AO1.
const RECORD_COUNT: usize = 13;

#[derive(Debug, Clone, Copy)]
struct Link {
    output: Channel,
    mode: LinkMode,
}

#[derive(Debug, Clone, Copy)]
struct MonitorRecord {
    /// Channel being sampled; for input groups this is the mode tag.
    subject: Option<Channel>,
    stable_ms: u64,
    min_variation: f32,
    notify: bool,
    link: Option<Link>,
    /// Last committed value, `None` until the first commit.
    settled: Option<f32>,
    last_ts: u64,
}

impl MonitorRecord {
    const EMPTY: Self = Self {
        subject: None,
        stable_ms: 0,
        min_variation: 0.0,
        notify: false,
        link: None,
        settled: None,
        last_ts: 0,
    };

    #[inline]
    fn is_active(&self) -> bool {
        self.notify || self.link.is_some()
    }

    /// Restart monitoring of `subject` from the unset state.
    fn arm(&mut self, subject: Channel, stable_ms: u64, min_variation: f32, now: u64) {
        self.subject = Some(subject);
        self.stable_ms = stable_ms;
        self.min_variation = min_variation;
        self.settled = None;
        self.last_ts = now;
    }

    /// Feed one sample; returns the value if it commits on this tick.
    ///
    /// Any sample that is not an accepted candidate (unchanged, or a
    /// sub-threshold wobble) restarts the stability window.
    fn settle(&mut self, value: f32, now: u64, full_scale: Option<f32>) -> Option<f32> {
        let candidate = match self.settled {
            Some(prev) if prev == value => false,
            Some(prev) => {
                let diff = if prev > value { prev - value } else { value - prev };
                diff >= self.min_variation || value == 0.0 || Some(value) == full_scale
            }
            None => true,
        };

        if !candidate {
            self.last_ts = now;
            return None;
        }

        if now.saturating_sub(self.last_ts) >= self.stable_ms {
            self.settled = Some(value);
            self.last_ts = now;
            Some(value)
        } else {
            None
        }
    }
}

/// Record slot for a channel; tri-mode inputs share their group's slot.
const fn slot(channel: Channel) -> usize {
    match channel {
        Channel::DI1 | Channel::AV1 | Channel::AI1 => 0,
        Channel::DI2 | Channel::AV2 | Channel::AI2 => 1,
        Channel::DI3 | Channel::AV3 | Channel::AI3 => 2,
        Channel::DI4 | Channel::AV4 | Channel::AI4 => 3,
        Channel::DI5 => 4,
        Channel::DI6 => 5,
        Channel::DO1 => 6,
        Channel::DO2 => 7,
        Channel::DO3 => 8,
        Channel::DO4 => 9,
        Channel::DO5 => 10,
        Channel::DO6 => 11,
        Channel::AO1 => 12,
    }
}

/// Polling engine that owns the sampler and all monitoring records.
///
/// One engine exists per physical board. Protocol adapters share it by
/// reference and go through its read/write/subscribe methods.
pub struct Engine<P, C, L> {
    sampler: Sampler<P>,
    clock: C,
    listener: L,
    records: [MonitorRecord; RECORD_COUNT],
}

impl<P: IoPins, C: Clock, L: ChannelListener> Engine<P, C, L> {
    /// Create an engine with every record empty.
    pub fn new(sampler: Sampler<P>, clock: C, listener: L) -> Self {
        Self {
            sampler,
            clock,
            listener,
            records: [MonitorRecord::EMPTY; RECORD_COUNT],
        }
    }

    /// Configure the hardware; see [`Sampler::setup`].
    pub fn setup(&mut self) {
        self.sampler.setup();
    }

    /// Notify the listener when a digital channel settles on a new level.
    ///
    /// Accepts DI1..DI6 and DO1..DO6 present on the board; anything else is
    /// ignored. Replaces any earlier subscription on the same terminal and
    /// keeps an existing DI/DO link.
    pub fn subscribe_digital(&mut self, channel: Channel, stable_ms: u64) {
        if !channel.is_digital() || self.sampler.pin(channel).is_none() {
            warn!("digital subscription on {} ignored", channel);
            return;
        }
        let now = self.clock.now_ms();
        let record = &mut self.records[slot(channel)];
        record.arm(channel, stable_ms, 0.0, now);
        record.notify = true;
        debug!("subscribed {} (stable {} ms)", channel, stable_ms);
    }

    /// Notify the listener when an analog channel settles on a new value.
    ///
    /// Accepts AV1..AV4, AI1..AI4 and AO1. Changes smaller than
    /// `min_variation` are not reported unless they land on zero or full
    /// scale.
    pub fn subscribe_analog(&mut self, channel: Channel, stable_ms: u64, min_variation: f32) {
        let analog = channel.is_analog_input() || channel.kind() == ChannelKind::AnalogOutput;
        if !analog || self.sampler.pin(channel).is_none() {
            warn!("analog subscription on {} ignored", channel);
            return;
        }
        let now = self.clock.now_ms();
        let record = &mut self.records[slot(channel)];
        record.arm(channel, stable_ms, min_variation, now);
        record.notify = true;
        debug!(
            "subscribed {} (stable {} ms, min variation {})",
            channel,
            stable_ms,
            min_variation
        );
    }

    /// Drive digital output `output` from digital input `input`.
    ///
    /// An existing listener subscription on the input is kept; both fire on
    /// the same committed transitions.
    pub fn link_di_do(&mut self, input: Channel, output: Channel, mode: LinkMode, stable_ms: u64) {
        let valid = input.kind() == ChannelKind::DigitalInput
            && output.kind() == ChannelKind::DigitalOutput
            && self.sampler.pin(input).is_some()
            && self.sampler.pin(output).is_some();
        if !valid {
            warn!("link {} -> {} ignored", input, output);
            return;
        }
        let now = self.clock.now_ms();
        let record = &mut self.records[slot(input)];
        record.arm(input, stable_ms, 0.0, now);
        record.link = Some(Link { output, mode });
        debug!("linked {} -> {} ({})", input, output, mode);
    }

    /// Drop the subscription and link on the terminal of `channel`.
    pub fn unsubscribe(&mut self, channel: Channel) {
        let record = &mut self.records[slot(channel)];
        record.notify = false;
        record.link = None;
        record.settled = None;
    }

    /// Run one polling tick over all records.
    ///
    /// Records are evaluated in a fixed order: DI1..DI6, DO1..DO6, AO1.
    /// Each record notifies and drives its link at most once per call.
    pub fn process(&mut self) {
        let Self {
            sampler,
            clock,
            listener,
            records,
        } = self;

        for record in records.iter_mut() {
            if !record.is_active() {
                continue;
            }
            let Some(subject) = record.subject else {
                continue;
            };
            let Some(value) = sampler.read(subject) else {
                continue;
            };
            let now = clock.now_ms();
            let full_scale = sampler.board().full_scale(subject);

            if let Some(value) = record.settle(value, now, full_scale) {
                trace!("{} settled at {}", subject, value);
                if record.notify {
                    listener.on_change(subject, value);
                }
                if let Some(link) = record.link {
                    debug!("{} {} -> {}", subject, link.mode, link.output);
                    link.mode.apply(value, link.output, sampler);
                }
            }
        }
    }

    /// Last committed value of `channel`, if it is being monitored.
    #[must_use]
    pub fn settled(&self, channel: Channel) -> Option<f32> {
        let record = &self.records[slot(channel)];
        if record.subject == Some(channel) && record.is_active() {
            record.settled
        } else {
            None
        }
    }

    /// Mode in which tri-mode input `group` (1..=4) is currently monitored.
    #[must_use]
    pub fn input_mode(&self, group: u8) -> Option<InputMode> {
        let channel = Channel::input(group, InputMode::Digital)?;
        let record = &self.records[slot(channel)];
        if !record.is_active() {
            return None;
        }
        record.subject.and_then(Channel::input_mode)
    }

    /// Read a channel; see [`Sampler::read`].
    pub fn read(&mut self, channel: Channel) -> Option<f32> {
        self.sampler.read(channel)
    }

    /// Averaged analog read; see [`Sampler::read_averaged`].
    pub fn read_averaged(&mut self, channel: Channel, n: u16) -> Option<f32> {
        self.sampler.read_averaged(channel, n)
    }

    /// Write an output; see [`Sampler::write`].
    pub fn write(&mut self, channel: Channel, value: f32) {
        self.sampler.write(channel, value);
    }

    /// Invert a digital output; see [`Sampler::flip`].
    pub fn flip(&mut self, channel: Channel) {
        self.sampler.flip(channel);
    }

    /// Get a reference to the sampler.
    pub fn sampler(&self) -> &Sampler<P> {
        &self.sampler
    }

    /// Get a mutable reference to the sampler.
    pub fn sampler_mut(&mut self) -> &mut Sampler<P> {
        &mut self.sampler
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Get a reference to the listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Get a mutable reference to the listener.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Decompose the engine into its sampler, clock and listener.
    pub fn into_parts(self) -> (Sampler<P>, C, L) {
        (self.sampler, self.clock, self.listener)
    }
}
