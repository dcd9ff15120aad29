//! System configuration parameters
//!
//! All tunable parameters for the analyser.  Values load from an optional
//! JSON file at startup; anything out of range is clamped at the point of
//! use (sequencer setters), never rejected, so a hand-edited file cannot
//! stop the daemon from coming up.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Acquisition ---
    /// Rotation update interval (milliseconds). Effective range 100–1999.
    pub update_interval_ms: u32,
    /// Pulses to aim for per colour window. Effective range 10–100.
    pub sample_size: u32,
    /// Frequency-divider selection: 0 = off, 1 = 2 %, 2 = 20 %, 3 = 100 %.
    /// Values above 3 behave as 3.
    pub frequency_scale: u8,

    // --- Reference data ---
    /// CSV table used for narrow-range readings.
    pub narrow_table_path: String,
    /// CSV table used for wide-range readings.
    pub wide_table_path: String,

    // --- Feedback ---
    /// Directory holding `<label>.mp3` result clips.
    pub audio_dir: String,
    /// External player command used to voice results.
    pub audio_player: String,

    // --- Timing ---
    /// Button poll interval (milliseconds).
    pub button_poll_interval_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Acquisition: one reading per second, 20 pulses per window,
            // 20 % output scaling.
            update_interval_ms: 1000,
            sample_size: 20,
            frequency_scale: 2,

            // Reference data
            narrow_table_path: "narrow_data.csv".to_owned(),
            wide_table_path: "wide_data.csv".to_owned(),

            // Feedback
            audio_dir: "audio".to_owned(),
            audio_player: "omxplayer".to_owned(),

            // Timing
            button_poll_interval_ms: 500,
        }
    }
}
