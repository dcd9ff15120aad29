//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ acquisition core (domain)
//! ```
//!
//! Driven adapters (GPIO, the system clock, log/telemetry sinks) implement
//! these traits.  The sequencer, chime, and acquisition service consume
//! them via generics, so the domain core never touches hardware directly
//! and every timed behaviour runs against a mock clock in tests.

use std::time::Duration;

use crate::pins::{Level, Line};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Pin port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for every output line the application drives.
pub trait PinPort {
    /// Drive `line` to `level`.
    ///
    /// Re-asserting a line's current level is idempotent: only an actual
    /// level change produces an electrical edge, and adapters that loop
    /// select-line writes back into the edge feed must deduplicate.
    fn set_line(&mut self, line: Line, level: Level);
}

// ───────────────────────────────────────────────────────────────
// Clock port (domain → time source)
// ───────────────────────────────────────────────────────────────

/// Monotonic time plus blocking sleep.
///
/// Sleeps run on the caller's own thread — the sequencing context — and
/// must never be invoked from the edge-notification context.
pub trait ClockPort {
    /// Monotonic time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Block the calling thread for `dur`.
    fn sleep(&self, dur: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (log, test capture, future telemetry).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
