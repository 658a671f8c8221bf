//! Recording state machine, episode keys, and artifact locators.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::session::ParticipantId;

/// State of one recording episode.
///
/// `Stopped` is terminal: a fresh enable mints a fresh key, it never reuses a
/// stopped episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// Created, not yet capturing.
    Idle,
    /// Actively capturing chunks.
    Active,
    /// Stopped; artifacts retained.
    Stopped,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Key of one recording episode: participant id plus a monotonic episode
/// sequence and start timestamp.
///
/// Participant association is carried structurally, never recovered by
/// substring-matching a filename (participant "1" must not match episodes of
/// participant "10").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingKey {
    participant: ParticipantId,
    episode: u64,
    unix_start_ms: i64,
}

impl RecordingKey {
    pub fn new(participant: ParticipantId, episode: u64) -> Self {
        Self {
            participant,
            episode,
            unix_start_ms: Utc::now().timestamp_millis(),
        }
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Filename stem for artifacts of this episode.
    pub fn file_stem(&self) -> String {
        format!("{}-{}-{}", self.participant, self.episode, self.unix_start_ms)
    }
}

impl fmt::Display for RecordingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// Locator of a finalized, downloadable/playable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocator(PathBuf);

impl ArtifactLocator {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for ArtifactLocator {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
