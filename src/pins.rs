//! GPIO pin assignments for the analyser head (BCM numbering).
//!
//! Single source of truth — every driver and adapter references this module
//! rather than hard-coding pin numbers.  Change a pin here and it propagates
//! everywhere.
//!
//! The TCS3200 breakout exposes six lines:
//!
//! | line | dir | purpose                                     |
//! |------|-----|---------------------------------------------|
//! | OUT  | in  | square wave, frequency ∝ filtered intensity |
//! | S0   | out | frequency-scale select (with S1)            |
//! | S1   | out | frequency-scale select (with S0)            |
//! | S2   | out | colour-filter select (with S3)              |
//! | S3   | out | colour-filter select (with S2)              |
//! | /OE  | out | output enable, active LOW                   |

// ---------------------------------------------------------------------------
// Logic levels
// ---------------------------------------------------------------------------

/// A digital logic level on a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

// ---------------------------------------------------------------------------
// Output lines driven by the core
// ---------------------------------------------------------------------------

/// Every output line the application drives, by role rather than pin number.
/// Adapters map these to physical pins via [`Line::bcm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Frequency-scale select bit 0 (TCS3200 S0).
    Scale0,
    /// Frequency-scale select bit 1 (TCS3200 S1).
    Scale1,
    /// Colour-filter select line A (TCS3200 S2).
    SelectA,
    /// Colour-filter select line B (TCS3200 S3).
    SelectB,
    /// Sensor output enable (TCS3200 /OE, active LOW).
    OutputEnable,
    /// Piezo chime driver.
    Chime,
}

impl Line {
    /// Physical BCM pin for this line on the analyser head.
    pub const fn bcm(self) -> u8 {
        match self {
            Self::Scale0 => 4,
            Self::Scale1 => 17,
            Self::SelectA => 22,
            Self::SelectB => 23,
            Self::OutputEnable => 18,
            Self::Chime => 21,
        }
    }
}

/// Level that enables the frequency output (/OE is active low).
pub const OUTPUT_ENABLE_ACTIVE: Level = Level::Low;
/// Level that disables the frequency output.
pub const OUTPUT_ENABLE_INACTIVE: Level = Level::High;

// ---------------------------------------------------------------------------
// Input lines (edge feed)
// ---------------------------------------------------------------------------

/// TCS3200 OUT — square wave sampled by rising-edge interrupt.
pub const FREQUENCY_GPIO: u8 = 24;

/// Momentary push-button requesting a narrow-range reading (rising edge,
/// internal pull-up).
pub const BUTTON_NARROW_GPIO: u8 = 5;
/// Momentary push-button requesting a wide-range reading.
pub const BUTTON_WIDE_GPIO: u8 = 6;

/// Mechanical-bounce lockout applied after a button press is accepted.
/// Matches the 300 ms stable window the deployed wiring was tuned for.
pub const BUTTON_LOCKOUT_MS: u64 = 300;
