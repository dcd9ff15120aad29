//! Spoken-result playback.
//!
//! Each pH label maps to a clip named `<label>.mp3` in the configured
//! directory, located case-insensitively; playback shells out to an
//! external player (omxplayer on the deployed hardware).  A missing clip
//! is an error for the caller to log, not a panic — the reading itself
//! already succeeded.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::AudioError;

/// Directory of result clips plus the player command used to voice them.
#[derive(Debug, Clone)]
pub struct AudioLibrary {
    dir: PathBuf,
    player: String,
}

impl AudioLibrary {
    pub fn new(dir: impl Into<PathBuf>, player: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            player: player.into(),
        }
    }

    /// Locate the clip for `label`, matching the file name case
    /// insensitively.
    pub fn find_clip(&self, label: &str) -> Option<PathBuf> {
        let wanted = format!("{}.mp3", label.to_lowercase());
        let entries = std::fs::read_dir(&self.dir).ok()?;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().to_lowercase() == wanted {
                return Some(entry.path());
            }
        }
        None
    }

    /// Play the clip for `label`, blocking until the player exits.
    pub fn play(&self, label: &str) -> Result<(), AudioError> {
        let clip = self
            .find_clip(label)
            .ok_or_else(|| AudioError::MissingClip(label.to_owned()))?;
        debug!("playing {}", clip.display());
        self.run_player(&clip)
    }

    fn run_player(&self, clip: &Path) -> Result<(), AudioError> {
        let status = Command::new(&self.player)
            .arg(clip)
            .status()
            .map_err(AudioError::Spawn)?;
        if status.success() {
            Ok(())
        } else {
            Err(AudioError::PlayerExit(status.code()))
        }
    }
}
