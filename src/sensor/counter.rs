//! Edge-triggered frequency counter state machine.
//!
//! Consumes the raw edge feed — rising edges on the sensor's OUT line plus
//! transitions of the two colour-select lines — and turns it into per-colour
//! Hertz.  Runs entirely on the edge-notification context: each call does a
//! handful of integer operations and, at the Green commit point, one
//! sequence-locked publish.  Nothing here blocks.
//!
//! Timestamps are a 32-bit free-running microsecond counter that wraps
//! roughly every 71.6 minutes.  All elapsed-time arithmetic uses modular
//! (`wrapping_sub`) differences, so a window that straddles the rollover
//! still produces a correct reading.

use std::sync::Arc;

use log::{debug, trace};

use crate::pins::Level;

use super::filter::{window_change, ColourChannel, Filter, SelectLine};
use super::snapshot::{ChannelReading, ReadingCell};

/// Microseconds per second, for tick-to-Hertz conversion.
const TICKS_PER_SEC: f64 = 1_000_000.0;

/// Input lines of the edge feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLine {
    /// The sensor's square-wave output.
    Frequency,
    /// One of the two colour-select lines.
    Select(SelectLine),
}

/// The frequency counter.
///
/// Owned exclusively by the edge-notification context; the rest of the
/// system sees only the triplets it publishes into the shared
/// [`ReadingCell`].
#[derive(Debug)]
pub struct EdgeCounter {
    /// Filter window currently open, tracked from select transitions.
    window: Filter,
    /// Rising edges seen since the current window opened.
    cycles: u32,
    /// Tick of the first edge in the window.
    start_tick: u32,
    /// Tick of the most recent edge in the window.
    last_tick: u32,
    /// Per-channel results accumulated during the current rotation.
    working: ChannelReading,
    /// Publication target, shared with the sequencing context.
    committed: Arc<ReadingCell>,
}

impl EdgeCounter {
    pub fn new(committed: Arc<ReadingCell>) -> Self {
        Self {
            window: Filter::Clear,
            cycles: 0,
            start_tick: 0,
            last_tick: 0,
            working: ChannelReading::default(),
            committed,
        }
    }

    /// Filter window the counter believes is open.
    pub fn window(&self) -> Filter {
        self.window
    }

    /// Feed one edge event.
    ///
    /// * `line` — which line transitioned.
    /// * `level` — the new level.
    /// * `tick` — microsecond timestamp; wraps at `u32::MAX`.
    pub fn on_edge(&mut self, line: EdgeLine, level: Level, tick: u32) {
        match line {
            EdgeLine::Frequency => self.on_pulse(level, tick),
            EdgeLine::Select(select) => self.on_select(select, level, tick),
        }
    }

    fn on_pulse(&mut self, level: Level, tick: u32) {
        if level != Level::High {
            return;
        }
        if self.cycles == 0 {
            self.start_tick = tick;
        } else {
            self.last_tick = tick;
        }
        self.cycles += 1;
        trace!(
            "pulse cycles={} start={} last={}",
            self.cycles, self.start_tick, self.last_tick
        );
    }

    fn on_select(&mut self, select: SelectLine, level: Level, tick: u32) {
        let change = window_change(select, level);
        debug_assert_eq!(
            change.closes,
            self.window.channel(),
            "select edge does not match the open window"
        );

        match change.closes {
            // Clear -> Red only starts counting; nothing to commit.
            None => {
                self.cycles = 0;
            }
            Some(channel) => {
                let (hertz, tally) = self.window_result();
                self.working.hertz[channel.index()] = hertz;
                self.working.tally[channel.index()] = tally;
                self.cycles = 0;
                debug!(
                    "window {channel:?} closed at tick {tick}: {hertz:.1} Hz over {tally} pulses"
                );

                // Green closes last in the rotation, so all three channels
                // are fresh: publish the triplet as one unit.
                if channel == ColourChannel::Green {
                    self.committed.publish(&self.working);
                }
            }
        }

        self.window = change.opens;
    }

    /// Hertz and tally for the window that just ended.  A window with zero
    /// or one edges has no measurable period and reads as silent.
    fn window_result(&self) -> (f64, u32) {
        if self.cycles <= 1 {
            return (0.0, 0);
        }
        let intervals = self.cycles - 1;
        let elapsed = self.last_tick.wrapping_sub(self.start_tick);
        if elapsed == 0 {
            return (0.0, 0);
        }
        let hertz = f64::from(intervals) * TICKS_PER_SEC / f64::from(elapsed);
        (hertz, intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (EdgeCounter, Arc<ReadingCell>) {
        let cell = Arc::new(ReadingCell::new());
        (EdgeCounter::new(Arc::clone(&cell)), cell)
    }

    /// Feed `n` rising edges starting at `start`, spaced `period` ticks.
    /// Ticks wrap like the real counter.
    fn pulses(c: &mut EdgeCounter, n: u32, start: u32, period: u32) {
        for k in 0..n {
            let tick = start.wrapping_add(k.wrapping_mul(period));
            c.on_edge(EdgeLine::Frequency, Level::High, tick);
        }
    }

    fn open_red(c: &mut EdgeCounter, tick: u32) {
        c.on_edge(EdgeLine::Select(SelectLine::A), Level::Low, tick);
    }

    fn close_red_open_blue(c: &mut EdgeCounter, tick: u32) {
        c.on_edge(EdgeLine::Select(SelectLine::B), Level::High, tick);
    }

    fn close_blue_open_green(c: &mut EdgeCounter, tick: u32) {
        c.on_edge(EdgeLine::Select(SelectLine::A), Level::High, tick);
    }

    fn close_green_open_clear(c: &mut EdgeCounter, tick: u32) {
        c.on_edge(EdgeLine::Select(SelectLine::B), Level::Low, tick);
    }

    #[test]
    fn pulse_train_yields_expected_hertz() {
        let (mut c, cell) = counter();
        open_red(&mut c, 0);
        // 21 edges spaced 500 us: 20 intervals over 10_000 us = 2000 Hz.
        pulses(&mut c, 21, 1_000, 500);
        close_red_open_blue(&mut c, 12_000);
        pulses(&mut c, 2, 13_000, 250);
        close_blue_open_green(&mut c, 14_000);
        pulses(&mut c, 2, 15_000, 250);
        close_green_open_clear(&mut c, 16_000);

        let r = cell.load();
        assert!((r.hertz[ColourChannel::Red.index()] - 2000.0).abs() < 1e-9);
        assert_eq!(r.tally[ColourChannel::Red.index()], 20);
    }

    #[test]
    fn zero_or_one_edge_reads_as_silent() {
        let (mut c, cell) = counter();
        open_red(&mut c, 0);
        // Red window: exactly one edge.
        pulses(&mut c, 1, 100, 0);
        close_red_open_blue(&mut c, 1_000);
        // Blue window: no edges at all.
        close_blue_open_green(&mut c, 2_000);
        // Green window: a real signal, to trigger the commit.
        pulses(&mut c, 11, 3_000, 100);
        close_green_open_clear(&mut c, 5_000);

        let r = cell.load();
        assert_eq!(r.hertz[ColourChannel::Red.index()], 0.0);
        assert_eq!(r.tally[ColourChannel::Red.index()], 0);
        assert_eq!(r.hertz[ColourChannel::Blue.index()], 0.0);
        assert_eq!(r.tally[ColourChannel::Blue.index()], 0);
        assert!(r.hertz[ColourChannel::Green.index()] > 0.0);
    }

    #[test]
    fn nothing_commits_before_green_closes() {
        let (mut c, cell) = counter();
        open_red(&mut c, 0);
        pulses(&mut c, 50, 100, 100);
        close_red_open_blue(&mut c, 6_000);
        pulses(&mut c, 50, 6_100, 100);
        close_blue_open_green(&mut c, 12_000);

        // Red and Blue closed, Green still open: the public triplet must
        // still be the initial all-zero reading.
        assert!(cell.load().is_empty());

        pulses(&mut c, 50, 12_100, 100);
        close_green_open_clear(&mut c, 18_000);
        assert!(!cell.load().is_empty());
    }

    #[test]
    fn clear_to_red_resets_without_committing() {
        let (mut c, cell) = counter();
        // Stray pulses during the Clear window.
        pulses(&mut c, 30, 0, 100);
        open_red(&mut c, 5_000);
        assert!(cell.load().is_empty());

        // The stray cycles must not leak into the Red measurement.
        pulses(&mut c, 11, 6_000, 100);
        close_red_open_blue(&mut c, 8_000);
        close_blue_open_green(&mut c, 9_000);
        pulses(&mut c, 11, 9_100, 100);
        close_green_open_clear(&mut c, 11_000);

        let r = cell.load();
        assert_eq!(r.tally[ColourChannel::Red.index()], 10);
    }

    #[test]
    fn falling_edges_on_the_frequency_line_are_ignored() {
        let (mut c, cell) = counter();
        open_red(&mut c, 0);
        for k in 0..20 {
            c.on_edge(EdgeLine::Frequency, Level::High, 100 + k * 100);
            c.on_edge(EdgeLine::Frequency, Level::Low, 150 + k * 100);
        }
        close_red_open_blue(&mut c, 3_000);
        close_blue_open_green(&mut c, 4_000);
        pulses(&mut c, 2, 4_100, 100);
        close_green_open_clear(&mut c, 5_000);

        // 20 rising edges -> 19 intervals of 100 us -> 10 kHz.
        let r = cell.load();
        assert_eq!(r.tally[ColourChannel::Red.index()], 19);
        assert!((r.hertz[ColourChannel::Red.index()] - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn window_straddling_tick_rollover_still_measures_correctly() {
        let (mut c, cell) = counter();
        open_red(&mut c, u32::MAX - 10_000);
        // 11 edges spaced 1000 us starting just below the rollover: the
        // last few land after the wrap to zero.
        pulses(&mut c, 11, u32::MAX - 5_000, 1_000);
        close_red_open_blue(&mut c, 6_000);
        close_blue_open_green(&mut c, 7_000);
        pulses(&mut c, 2, 7_100, 100);
        close_green_open_clear(&mut c, 8_000);

        // 10 intervals of 1000 us = 1000 Hz, despite the wrap.
        let r = cell.load();
        assert_eq!(r.tally[ColourChannel::Red.index()], 10);
        assert!((r.hertz[ColourChannel::Red.index()] - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_edges_do_not_divide_by_zero() {
        let (mut c, cell) = counter();
        open_red(&mut c, 0);
        // Two edges with identical ticks: no measurable interval.
        pulses(&mut c, 2, 500, 0);
        close_red_open_blue(&mut c, 1_000);
        close_blue_open_green(&mut c, 2_000);
        pulses(&mut c, 2, 2_100, 100);
        close_green_open_clear(&mut c, 3_000);

        let r = cell.load();
        assert_eq!(r.hertz[ColourChannel::Red.index()], 0.0);
        assert_eq!(r.tally[ColourChannel::Red.index()], 0);
    }

    #[test]
    fn window_tracking_follows_the_rotation() {
        let (mut c, _cell) = counter();
        assert_eq!(c.window(), Filter::Clear);
        open_red(&mut c, 0);
        assert_eq!(c.window(), Filter::Red);
        close_red_open_blue(&mut c, 1);
        assert_eq!(c.window(), Filter::Blue);
        close_blue_open_green(&mut c, 2);
        assert_eq!(c.window(), Filter::Green);
        close_green_open_clear(&mut c, 3);
        assert_eq!(c.window(), Filter::Clear);
    }

    #[test]
    fn second_rotation_replaces_the_first() {
        let (mut c, cell) = counter();
        for rotation in 1..=2u32 {
            let base = rotation * 100_000;
            let period = 100 * rotation;
            open_red(&mut c, base);
            pulses(&mut c, 11, base + 100, period);
            close_red_open_blue(&mut c, base + 10_000);
            pulses(&mut c, 11, base + 10_100, period);
            close_blue_open_green(&mut c, base + 20_000);
            pulses(&mut c, 11, base + 20_100, period);
            close_green_open_clear(&mut c, base + 30_000);
        }
        // Second rotation: 10 intervals of 200 us -> 5000 Hz everywhere.
        let r = cell.load();
        for hz in r.hertz {
            assert!((hz - 5_000.0).abs() < 1e-9);
        }
    }
}
