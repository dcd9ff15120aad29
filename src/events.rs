//! Interrupt-fed request latch.
//!
//! Button presses arrive on the GPIO edge-notification context, which must
//! do minimal, non-blocking work.  Each press sets one atomic flag; the
//! button poll loop drains the flags at its own pace and turns them into
//! queued read requests.
//!
//! ```text
//! ┌─────────────┐    set     ┌──────────────┐   take    ┌─────────────┐
//! │ button ISR  │ ─────────▶ │ RequestLatch │ ────────▶ │  poll loop  │
//! │ (edge ctx)  │            │ (two flags)  │           │ (main)      │
//! └─────────────┘            └──────────────┘           └─────────────┘
//! ```
//!
//! A latch, not a queue: presses arriving while a flag is already set
//! coalesce into a single pending request, which also makes contact bounce
//! harmless at this layer.

use std::sync::atomic::{AtomicBool, Ordering};

/// Which reference table a reading should be classified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadKind {
    /// Narrow-range table (finer pH steps around neutral).
    Narrow,
    /// Wide-range table (full pH scale).
    Wide,
}

impl ReadKind {
    /// Stable slot index, used for per-kind bookkeeping arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Narrow => 0,
            Self::Wide => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::Wide => "wide",
        }
    }
}

impl std::fmt::Display for ReadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free pending-request flags, shared between the edge-notification
/// context (writer) and the button poll loop (consumer).
#[derive(Debug, Default)]
pub struct RequestLatch {
    narrow: AtomicBool,
    wide: AtomicBool,
}

impl RequestLatch {
    pub const fn new() -> Self {
        Self {
            narrow: AtomicBool::new(false),
            wide: AtomicBool::new(false),
        }
    }

    /// Record a pending request.  Safe to call from interrupt context.
    pub fn signal(&self, kind: ReadKind) {
        match kind {
            ReadKind::Narrow => self.narrow.store(true, Ordering::Release),
            ReadKind::Wide => self.wide.store(true, Ordering::Release),
        }
    }

    /// Take one pending request, clearing its flag.  Narrow is checked
    /// first, so a simultaneous pair drains narrow-then-wide over two polls.
    pub fn take(&self) -> Option<ReadKind> {
        if self.narrow.swap(false, Ordering::AcqRel) {
            return Some(ReadKind::Narrow);
        }
        if self.wide.swap(false, Ordering::AcqRel) {
            return Some(ReadKind::Wide);
        }
        None
    }

    /// True if either flag is pending.
    pub fn is_pending(&self) -> bool {
        self.narrow.load(Ordering::Acquire) || self.wide.load(Ordering::Acquire)
    }
}
