//! Signaling relay boundary.
//!
//! The relay is a thin room-scoped broadcaster: it forwards "peer joined/left"
//! notifications to members of a room and nothing else. Membership signaled
//! here is the source of truth for who is in the room; media never flows
//! through this channel.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::{ParticipantId, RoomId, SessionEvent};
use crate::utils::error::Result;

/// A joined signaling channel for one room.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Join `room` and announce `local_id` to its members.
    async fn join(&self, room: &RoomId, local_id: &ParticipantId) -> Result<()>;

    /// Leave the room.
    async fn leave(&self) -> Result<()>;
}

/// Builds a connected channel that emits
/// [`SessionEvent::PeerConnected`]/[`SessionEvent::PeerDisconnected`] through
/// the session event queue.
#[async_trait]
pub trait SignalingFactory: Send + Sync {
    async fn connect(
        &self,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<Arc<dyn SignalingChannel>>;
}
