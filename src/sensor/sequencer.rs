//! Channel sequencer — drives the colour rotation and adapts exposure.
//!
//! One rotation holds Red, Blue, then Green for their per-channel delays
//! (the order that flips one select line per step), gates the frequency
//! feed around the exposure, parks on Clear, and sleeps out the remainder
//! of the configured update interval.  After each rotation the per-channel
//! delays are retuned so the next rotation captures close to `sample_size`
//! pulses per window: channels that read silent get progressively longer
//! exposure instead.
//!
//! All sleeps happen on the sequencing thread through [`ClockPort`]; the
//! edge-notification context is never blocked from here.

use std::time::Duration;

use log::{debug, trace};

use crate::app::ports::{ClockPort, PinPort};
use crate::config::SystemConfig;
use crate::pins::{Line, OUTPUT_ENABLE_ACTIVE, OUTPUT_ENABLE_INACTIVE};

use super::filter::{ColourChannel, Filter, FrequencyScale};
use super::snapshot::{ChannelReading, ReadingCell};

// ---------------------------------------------------------------------------
// Tuning bounds
// ---------------------------------------------------------------------------

/// Allowed pulses-per-window range.  Fewer than 10 gives a noisy Hertz
/// estimate; more than 100 drags the rotation out.
pub const SAMPLE_SIZE_MIN: u32 = 10;
pub const SAMPLE_SIZE_MAX: u32 = 100;

/// Allowed per-channel exposure range in seconds.
pub const DELAY_MIN_SECS: f64 = 0.001;
pub const DELAY_MAX_SECS: f64 = 0.5;

/// Exposure added per rotation while a channel reads silent.
pub const NO_SIGNAL_STEP_SECS: f64 = 0.1;

/// Allowed rotation interval in milliseconds: [0.1 s, 2.0 s).
pub const UPDATE_INTERVAL_MIN_MS: u32 = 100;
pub const UPDATE_INTERVAL_MAX_MS: u32 = 1999;

/// Exposure used before the first retune has any data.
const INITIAL_DELAY_SECS: f64 = 0.1;

// ---------------------------------------------------------------------------
// Feed guard
// ---------------------------------------------------------------------------

/// Scoped enable of the sensor's frequency output.  The feed is disabled
/// again when the guard drops, on every exit path.
struct FeedGuard<'a, P: PinPort> {
    pins: &'a mut P,
}

impl<'a, P: PinPort> FeedGuard<'a, P> {
    fn enable(pins: &'a mut P) -> Self {
        pins.set_line(Line::OutputEnable, OUTPUT_ENABLE_ACTIVE);
        Self { pins }
    }

    fn pins(&mut self) -> &mut P {
        self.pins
    }
}

impl<P: PinPort> Drop for FeedGuard<'_, P> {
    fn drop(&mut self) {
        self.pins.set_line(Line::OutputEnable, OUTPUT_ENABLE_INACTIVE);
    }
}

// ---------------------------------------------------------------------------
// ChannelSequencer
// ---------------------------------------------------------------------------

/// Rotation driver and adaptive timing state.
///
/// Owned exclusively by the sequencing context.  The committed
/// [`ReadingCell`] is its only view into the counter's output.
#[derive(Debug)]
pub struct ChannelSequencer {
    filter: Filter,
    scale: FrequencyScale,
    interval_ms: u32,
    sample_size: u32,
    /// Per-channel exposure in seconds, indexed by [`ColourChannel::index`].
    delays: [f64; 3],
}

impl ChannelSequencer {
    /// Build a sequencer from configuration.  Out-of-range config values
    /// are clamped here, silently, the same way the setters clamp.
    pub fn new(config: &SystemConfig) -> Self {
        let mut seq = Self {
            filter: Filter::Clear,
            scale: FrequencyScale::from_index(config.frequency_scale),
            interval_ms: UPDATE_INTERVAL_MIN_MS,
            sample_size: SAMPLE_SIZE_MIN,
            delays: [INITIAL_DELAY_SECS; 3],
        };
        seq.set_update_interval_ms(config.update_interval_ms);
        seq.set_sample_size(config.sample_size);
        seq
    }

    // ── Configuration surface ─────────────────────────────────

    /// Select the colour filter, driving both select lines.  Only the line
    /// whose level actually changes produces an edge at the hardware.
    pub fn set_filter(&mut self, filter: Filter, pins: &mut impl PinPort) {
        let (a, b) = filter.select_levels();
        self.filter = filter;
        pins.set_line(Line::SelectA, a);
        pins.set_line(Line::SelectB, b);
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Select the output-frequency divider, driving both scale lines.
    pub fn set_frequency(&mut self, scale: FrequencyScale, pins: &mut impl PinPort) {
        let (s0, s1) = scale.scale_levels();
        self.scale = scale;
        pins.set_line(Line::Scale0, s0);
        pins.set_line(Line::Scale1, s1);
    }

    pub fn frequency(&self) -> FrequencyScale {
        self.scale
    }

    /// Set the pulses-per-window target.  Silently clamped to
    /// [`SAMPLE_SIZE_MIN`]..=[`SAMPLE_SIZE_MAX`].
    pub fn set_sample_size(&mut self, samples: u32) {
        self.sample_size = samples.clamp(SAMPLE_SIZE_MIN, SAMPLE_SIZE_MAX);
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    /// Set the rotation interval in seconds.  Silently clamped to
    /// [0.1 s, 2.0 s).  Negative and NaN inputs clamp to the minimum.
    pub fn set_update_interval(&mut self, secs: f64) {
        let ms = (secs * 1000.0).clamp(0.0, f64::from(UPDATE_INTERVAL_MAX_MS));
        self.set_update_interval_ms(ms as u32);
    }

    /// Millisecond form of [`set_update_interval`](Self::set_update_interval).
    pub fn set_update_interval_ms(&mut self, ms: u32) {
        self.interval_ms = ms.clamp(UPDATE_INTERVAL_MIN_MS, UPDATE_INTERVAL_MAX_MS);
    }

    /// Effective rotation interval in seconds.
    pub fn update_interval(&self) -> f64 {
        f64::from(self.interval_ms) / 1000.0
    }

    pub fn update_interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Current per-channel exposure delays in seconds.
    pub fn delays(&self) -> [f64; 3] {
        self.delays
    }

    // ── Rotation ──────────────────────────────────────────────

    /// Park the sensor in its idle configuration: divider applied, Clear
    /// filter selected, frequency feed disabled.
    pub fn initialise(&mut self, pins: &mut impl PinPort) {
        self.set_frequency(self.scale, pins);
        self.set_filter(Filter::Clear, pins);
        pins.set_line(Line::OutputEnable, OUTPUT_ENABLE_INACTIVE);
    }

    /// Run one full acquisition rotation and return the triplet it
    /// committed, retuning the next rotation's delays from it.
    pub fn run_rotation(
        &mut self,
        pins: &mut impl PinPort,
        clock: &impl ClockPort,
        committed: &ReadingCell,
    ) -> ChannelReading {
        let deadline = clock.now() + Duration::from_millis(u64::from(self.interval_ms));
        trace!("rotation start, delays {:?}", self.delays);

        {
            let mut feed = FeedGuard::enable(pins);
            for filter in [Filter::Red, Filter::Blue, Filter::Green] {
                // channel() is Some for all three exposure filters.
                let Some(channel) = filter.channel() else {
                    continue;
                };
                self.set_filter(filter, feed.pins());
                clock.sleep(Duration::from_secs_f64(self.delays[channel.index()]));
            }
        }

        // Selecting Clear drops select line B, which is the Green-window
        // close and the counter's commit point.
        self.set_filter(Filter::Clear, pins);

        // Sleep out the rest of the interval; if the exposure overran it,
        // proceed immediately rather than sleeping a negative duration.
        if let Some(remaining) = deadline.checked_sub(clock.now()) {
            clock.sleep(remaining);
        }

        let reading = committed.load();
        self.retune(&reading);
        reading
    }

    /// Retune per-channel delays from the latest committed reading: aim
    /// for `sample_size` pulses where a rate is known, stretch exposure
    /// where the channel was silent.
    fn retune(&mut self, reading: &ChannelReading) {
        for channel in ColourChannel::ALL {
            let i = channel.index();
            let hertz = reading.hertz[i];
            let delay = if hertz > 0.0 {
                f64::from(self.sample_size) / hertz
            } else {
                self.delays[i] + NO_SIGNAL_STEP_SECS
            };
            self.delays[i] = delay.clamp(DELAY_MIN_SECS, DELAY_MAX_SECS);
        }
        debug!("retuned delays {:?}", self.delays);
    }
}
