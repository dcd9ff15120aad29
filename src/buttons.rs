//! Button watcher — turns latched ISR presses into accepted requests.
//!
//! The edge-notification context only sets flags in a [`RequestLatch`];
//! this watcher is the consuming half, polled from the main loop.  On top
//! of the latch's natural coalescing it applies a per-button lockout so a
//! bounce tail arriving after a flag is drained cannot queue a phantom
//! second reading.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::app::ports::ClockPort;
use crate::events::{ReadKind, RequestLatch};
use crate::pins::BUTTON_LOCKOUT_MS;

/// Polling consumer of the button request latch.
pub struct ButtonWatcher {
    latch: Arc<RequestLatch>,
    lockout: Duration,
    last_accept: [Option<Duration>; 2],
}

impl ButtonWatcher {
    pub fn new(latch: Arc<RequestLatch>) -> Self {
        Self {
            latch,
            lockout: Duration::from_millis(BUTTON_LOCKOUT_MS),
            last_accept: [None; 2],
        }
    }

    /// Take one pending press, if any survives the lockout.
    ///
    /// Call from the main loop at the button poll interval.
    pub fn poll(&mut self, clock: &impl ClockPort) -> Option<ReadKind> {
        let kind = self.latch.take()?;
        let now = clock.now();
        let slot = kind.index();

        if let Some(accepted_at) = self.last_accept[slot] {
            if now.saturating_sub(accepted_at) < self.lockout {
                debug!("{kind} press within lockout, ignored");
                return None;
            }
        }

        self.last_accept[slot] = Some(now);
        Some(kind)
    }
}
