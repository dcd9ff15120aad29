//! Acquisition core for the TCS3200 colour sensor.
//!
//! Three cooperating pieces, split by execution context:
//!
//! * [`counter`] — consumes the raw edge feed on the edge-notification
//!   context and turns pulse trains into per-colour Hertz.
//! * [`sequencer`] — drives the filter rotation and adaptive exposure on
//!   the sequencing thread.
//! * [`classifier`] — maps a committed RGB-frequency triplet to the
//!   nearest reference pH by vector angle.
//!
//! The two contexts meet only at [`snapshot::ReadingCell`], where the
//! counter publishes one atomically consistent triplet per rotation.

pub mod classifier;
pub mod counter;
pub mod filter;
pub mod sequencer;
pub mod snapshot;

pub use classifier::{classify, Match};
pub use counter::{EdgeCounter, EdgeLine};
pub use filter::{ColourChannel, Filter, FrequencyScale, SelectLine};
pub use sequencer::ChannelSequencer;
pub use snapshot::{ChannelReading, ReadingCell};
