//! Unified error types for the analyser.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform.  Reading failures are
//! deliberately NOT errors: a silent channel degrades to a 0 Hz reading and
//! an unusable sample surfaces as a `NoSample` outcome, so the error types
//! here cover only genuinely exceptional conditions (bad reference data,
//! missing audio, hardware setup).

use std::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the analyser funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A reference table could not be loaded or failed validation.
    Table(TableError),
    /// An audio clip could not be located or played.
    Audio(AudioError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(e) => write!(f, "reference table: {e}"),
            Self::Audio(e) => write!(f, "audio: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Reference-table errors
// ---------------------------------------------------------------------------

/// Failures while loading or validating a pH reference table.
///
/// Row numbers are 1-based and refer to the source file.
#[derive(Debug)]
pub enum TableError {
    /// Underlying file could not be opened or read.
    Io(io::Error),
    /// CSV structure could not be parsed.
    Csv(csv::Error),
    /// A row has fewer than the four required fields.
    MissingField { row: usize },
    /// A colour component failed numeric parsing.
    BadComponent { row: usize },
    /// A colour component is negative or non-finite.
    OutOfRange { row: usize },
    /// All three components of a row are zero; such a row can never be
    /// matched and would divide by zero in the angle computation.
    ZeroMagnitude { row: usize },
    /// The table contains no rows at all.
    Empty,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Csv(e) => write!(f, "malformed CSV: {e}"),
            Self::MissingField { row } => write!(f, "row {row}: missing field"),
            Self::BadComponent { row } => write!(f, "row {row}: unparseable colour component"),
            Self::OutOfRange { row } => write!(f, "row {row}: colour component out of range"),
            Self::ZeroMagnitude { row } => write!(f, "row {row}: zero-magnitude reference"),
            Self::Empty => write!(f, "table has no rows"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<TableError> for Error {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

// ---------------------------------------------------------------------------
// Audio errors
// ---------------------------------------------------------------------------

/// Failures in the spoken-result playback path.
#[derive(Debug)]
pub enum AudioError {
    /// No clip named `<label>.mp3` exists in the clip directory.
    MissingClip(String),
    /// The player process could not be spawned.
    Spawn(io::Error),
    /// The player ran but exited with a failure status.
    PlayerExit(Option<i32>),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingClip(label) => write!(f, "no clip for label '{label}'"),
            Self::Spawn(e) => write!(f, "player failed to start: {e}"),
            Self::PlayerExit(Some(code)) => write!(f, "player exited with status {code}"),
            Self::PlayerExit(None) => write!(f, "player killed by signal"),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<AudioError> for Error {
    fn from(e: AudioError) -> Self {
        Self::Audio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
