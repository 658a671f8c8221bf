//! View adapter boundary.
//!
//! Rendering is out of scope; the orchestrator only issues surface commands.
//! One surface per participant, live or playback, unified by the `is_self`
//! flag instead of parallel local/remote code paths.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::media::StreamHandle;
use crate::recorder::ArtifactLocator;
use crate::session::{ParticipantId, SessionEvent};

/// What a surface displays: a live stream or a finalized recording artifact.
#[derive(Debug, Clone)]
pub enum VideoSource {
    Live(StreamHandle),
    Artifact(ArtifactLocator),
}

/// A render command for one participant's video surface.
#[derive(Debug, Clone)]
pub struct VideoSurface {
    pub participant: ParticipantId,
    pub source: VideoSource,
    pub is_self: bool,
}

/// The rendering layer consumed by the orchestrator.
#[async_trait]
pub trait ViewAdapter: Send + Sync {
    /// Wire UI intents (record toggle, leave) into the session event queue.
    ///
    /// Called before any asynchronous initialization step completes, so early
    /// interaction is never dropped.
    fn bind_intents(&self, events: mpsc::Sender<SessionEvent>);

    /// Render or replace a participant's surface.
    async fn render_video(&self, surface: VideoSurface);

    /// Remove a participant's surface. Removing an absent surface is a no-op.
    async fn remove_video(&self, participant: &ParticipantId);

    /// Report the aggregate remote participant count.
    async fn set_participant_count(&self, count: usize);
}
