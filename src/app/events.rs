//! Outbound application events.
//!
//! The acquisition service emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them — log to the journal, capture in tests, or
//! feed a future telemetry channel.

use crate::events::ReadKind;

/// Result of one serviced read request.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The sample matched a reference entry.
    Match {
        /// pH label of the winning row.
        label: String,
        /// Angle (radians) between sample and winner; near zero for a
        /// close match.
        angle: f64,
    },
    /// No usable sample: every channel read 0 Hz, or the table had no
    /// matchable rows.  The caller may simply retry.
    NoSample,
}

impl ReadOutcome {
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Match { label, .. } => Some(label),
            Self::NoSample => None,
        }
    }
}

/// Structured events emitted by the acquisition service.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started and initialised the sensor lines.
    Started,

    /// A queued request is now driving a rotation.
    ReadingStarted(ReadKind),

    /// A request completed; carries the classification outcome.
    ReadingCompleted {
        kind: ReadKind,
        outcome: ReadOutcome,
    },
}
