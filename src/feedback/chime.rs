//! Piezo chime driver.
//!
//! Short, fully synchronous pulse patterns on the chime line.  The sleeps
//! are long enough that this must only run on a feedback-capable thread
//! (main loop), never on the edge-notification context.

use std::time::Duration;

use crate::app::ports::{ClockPort, PinPort};
use crate::events::ReadKind;
use crate::pins::{Level, Line};

const LONG_PULSE: Duration = Duration::from_millis(500);
const SHORT_PULSE: Duration = Duration::from_millis(200);
const DOUBLE_GAP: Duration = Duration::from_millis(400);

/// Audible acknowledgement patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChimePattern {
    /// Single 0.5 s tone — startup greeting.
    Long,
    /// Single 0.2 s tone — narrow reading accepted.
    Short,
    /// Two 0.2 s tones, 0.4 s apart — wide reading accepted.
    DoubleShort,
}

impl ChimePattern {
    /// Acknowledgement pattern for an accepted read request.
    pub fn for_request(kind: ReadKind) -> Self {
        match kind {
            ReadKind::Narrow => Self::Short,
            ReadKind::Wide => Self::DoubleShort,
        }
    }
}

/// Chime line driver.
pub struct Chime;

impl Chime {
    pub fn play(pattern: ChimePattern, pins: &mut impl PinPort, clock: &impl ClockPort) {
        match pattern {
            ChimePattern::Long => Self::pulse(LONG_PULSE, pins, clock),
            ChimePattern::Short => Self::pulse(SHORT_PULSE, pins, clock),
            ChimePattern::DoubleShort => {
                Self::pulse(SHORT_PULSE, pins, clock);
                clock.sleep(DOUBLE_GAP);
                Self::pulse(SHORT_PULSE, pins, clock);
            }
        }
    }

    fn pulse(duration: Duration, pins: &mut impl PinPort, clock: &impl ClockPort) {
        pins.set_line(Line::Chime, Level::High);
        clock.sleep(duration);
        pins.set_line(Line::Chime, Level::Low);
    }
}
