//! Orchestrator-owned session state.
//!
//! [`PeerSet`] and [`RecordingRegistry`] are mutated only by the orchestrator's
//! event handlers, which run serialized; neither needs a lock.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::media::StreamHandle;
use crate::recorder::{Recorder, RecordingKey};
use crate::transport::CallHandle;
use crate::utils::error::Result;

use super::events::{ParticipantId, RoomId};

/// Configuration for one room session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Room to join.
    pub room: RoomId,

    /// Directory finalized recordings are written to.
    pub output_dir: PathBuf,

    /// Directory artifacts are exported to on leave.
    pub download_dir: PathBuf,

    /// Consecutive call errors tolerated before a peer is treated as
    /// disconnected.
    pub call_error_budget: u32,
}

impl SessionConfig {
    pub fn new(
        room: impl Into<RoomId>,
        output_dir: impl Into<PathBuf>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            room: room.into(),
            output_dir: output_dir.into(),
            download_dir: download_dir.into(),
            call_error_budget: 3,
        }
    }

    /// Load a session configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// One live remote peer.
#[derive(Debug, Clone)]
pub struct PeerEntry {
    pub call: CallHandle,
    pub stream: StreamHandle,
    /// Consecutive call errors since the last successful event.
    pub call_errors: u32,
}

/// The set of live remote peers. An id is added at most once until removed.
#[derive(Default)]
pub struct PeerSet {
    peers: HashMap<ParticipantId, PeerEntry>,
}

impl PeerSet {
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.peers.contains_key(id)
    }

    /// Insert a peer. Returns `false` without mutating when the id is already
    /// present, so a duplicate registration can never yield two entries.
    pub fn insert(&mut self, id: ParticipantId, entry: PeerEntry) -> bool {
        if self.peers.contains_key(&id) {
            return false;
        }
        self.peers.insert(id, entry);
        true
    }

    pub fn remove(&mut self, id: &ParticipantId) -> Option<PeerEntry> {
        self.peers.remove(id)
    }

    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut PeerEntry> {
        self.peers.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &PeerEntry)> {
        self.peers.iter()
    }
}

/// Registry of every recording episode, with an explicit participant index.
///
/// The index replaces substring key matching: participant "1" must never match
/// episodes of participant "10".
#[derive(Default)]
pub struct RecordingRegistry {
    sessions: HashMap<RecordingKey, Recorder>,
    by_participant: HashMap<ParticipantId, Vec<RecordingKey>>,
    next_episode: u64,
}

impl RecordingRegistry {
    /// Mint the next episode key for `participant`. Keys are never reused.
    pub fn next_key(&mut self, participant: &ParticipantId) -> RecordingKey {
        let key = RecordingKey::new(participant.clone(), self.next_episode);
        self.next_episode += 1;
        key
    }

    pub fn insert(&mut self, recorder: Recorder) {
        let key = recorder.key().clone();
        self.by_participant
            .entry(key.participant().clone())
            .or_default()
            .push(key.clone());
        self.sessions.insert(key, recorder);
    }

    pub fn get(&self, key: &RecordingKey) -> Option<&Recorder> {
        self.sessions.get(key)
    }

    pub fn get_mut(&mut self, key: &RecordingKey) -> Option<&mut Recorder> {
        self.sessions.get_mut(key)
    }

    /// Every episode key ever minted for `participant`, historical included.
    pub fn keys_for(&self, participant: &ParticipantId) -> Vec<RecordingKey> {
        self.by_participant
            .get(participant)
            .cloned()
            .unwrap_or_default()
    }

    /// True when `participant` has an actively capturing episode.
    pub fn has_active(&self, participant: &ParticipantId) -> bool {
        self.by_participant
            .get(participant)
            .map_or(false, |keys| {
                keys.iter()
                    .any(|k| self.sessions.get(k).map_or(false, Recorder::is_active))
            })
    }

    pub fn active_keys(&self) -> Vec<RecordingKey> {
        self.sessions
            .values()
            .filter(|r| r.is_active())
            .map(|r| r.key().clone())
            .collect()
    }

    pub fn all_keys(&self) -> Vec<RecordingKey> {
        self.sessions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|r| r.is_active()).count()
    }
}
