//! Committed channel readings and the cross-context hand-off cell.
//!
//! The frequency counter runs on the edge-notification context; the
//! sequencer reads results on its own thread.  The only state they share is
//! the last committed triplet, published here as a single atomically
//! consistent unit — the sequencer can never observe hertz values from two
//! different rotations mixed together.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::filter::ColourChannel;

// ---------------------------------------------------------------------------
// ChannelReading
// ---------------------------------------------------------------------------

/// One committed RGB-frequency triplet.
///
/// Either all three channels reflect measurements from the same rotation,
/// or the reading is all-zero (no signal seen yet).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelReading {
    /// Measured frequency per channel, indexed by [`ColourChannel::index`].
    /// 0.0 means no signal was detected in that window.
    pub hertz: [f64; 3],
    /// Raw pulse count per channel for the same windows.
    pub tally: [u32; 3],
}

impl ChannelReading {
    /// True when no channel saw any signal — an unusable sample.
    pub fn is_empty(&self) -> bool {
        self.hertz.iter().all(|h| *h == 0.0)
    }

    pub fn channel_hertz(&self, channel: ColourChannel) -> f64 {
        self.hertz[channel.index()]
    }
}

// ---------------------------------------------------------------------------
// ReadingCell
// ---------------------------------------------------------------------------

/// Sequence-locked cell holding the latest committed [`ChannelReading`].
///
/// Single writer (the frequency counter, at the Green-window commit point),
/// any number of readers.  The writer brackets its field stores with an
/// odd/even sequence number; a reader retries whenever it observes an odd
/// number or a number that changed mid-read, so a torn triplet can never
/// escape.  All accesses are `SeqCst`: the sequence sandwich must be
/// totally ordered with the field stores for the retry check to be sound.
#[derive(Debug)]
pub struct ReadingCell {
    seq: AtomicU32,
    hertz_bits: [AtomicU64; 3],
    tally: [AtomicU32; 3],
}

impl ReadingCell {
    pub const fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            hertz_bits: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
            tally: [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    /// Publish a new committed triplet.  Must only be called from the
    /// single writing context.
    pub fn publish(&self, reading: &ChannelReading) {
        let seq = self.seq.load(Ordering::SeqCst);
        self.seq.store(seq.wrapping_add(1), Ordering::SeqCst);
        for i in 0..3 {
            self.hertz_bits[i].store(reading.hertz[i].to_bits(), Ordering::SeqCst);
            self.tally[i].store(reading.tally[i], Ordering::SeqCst);
        }
        self.seq.store(seq.wrapping_add(2), Ordering::SeqCst);
    }

    /// Load the latest committed triplet, retrying across concurrent
    /// publishes.  Lock-free for the writer; the reader spins only while a
    /// publish is in flight.
    pub fn load(&self) -> ChannelReading {
        loop {
            let before = self.seq.load(Ordering::SeqCst);
            if before & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }
            let mut reading = ChannelReading::default();
            for i in 0..3 {
                reading.hertz[i] = f64::from_bits(self.hertz_bits[i].load(Ordering::SeqCst));
                reading.tally[i] = self.tally[i].load(Ordering::SeqCst);
            }
            if self.seq.load(Ordering::SeqCst) == before {
                return reading;
            }
        }
    }
}

impl Default for ReadingCell {
    fn default() -> Self {
        Self::new()
    }
}
