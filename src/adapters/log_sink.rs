//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger.  A future telemetry adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::{AppEvent, ReadOutcome};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the journal.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | sensor lines initialised");
            }
            AppEvent::ReadingStarted(kind) => {
                info!("READ  | {kind} reading started");
            }
            AppEvent::ReadingCompleted { kind, outcome } => match outcome {
                ReadOutcome::Match { label, angle } => {
                    info!("READ  | {kind} reading done: pH {label} (angle {angle:.4} rad)");
                }
                ReadOutcome::NoSample => {
                    warn!("READ  | {kind} reading done: no usable sample");
                }
            },
        }
    }
}
