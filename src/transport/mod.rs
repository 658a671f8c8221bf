//! Peer call transport boundary.
//!
//! Abstracts the point-to-point media session layer (negotiation, codecs, NAT
//! traversal live behind this seam). The transport assigns the local endpoint
//! its identity and emits [`SessionEvent`]s for inbound calls, received
//! streams, and call errors/closures through the session event queue handed to
//! its factory.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::media::StreamHandle;
use crate::session::{ParticipantId, SessionEvent};
use crate::utils::error::Result;

/// Handle to an established or establishing point-to-point call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallHandle {
    id: Uuid,
    peer: ParticipantId,
}

impl CallHandle {
    pub fn new(peer: ParticipantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The remote endpoint of this call.
    pub fn peer(&self) -> &ParticipantId {
        &self.peer
    }
}

/// The call transport consumed by the orchestrator.
#[async_trait]
pub trait CallTransport: Send + Sync {
    /// Identity assigned to the local endpoint when the transport connected.
    fn local_id(&self) -> ParticipantId;

    /// Place an outbound call to `peer` carrying the local stream.
    async fn place(&self, peer: &ParticipantId, stream: StreamHandle) -> Result<CallHandle>;

    /// Answer an incoming call with the local stream.
    async fn answer(&self, call: &CallHandle, stream: StreamHandle) -> Result<()>;

    /// Close an established call.
    async fn hang_up(&self, call: &CallHandle) -> Result<()>;
}

/// Builds a connected transport wired to the session event queue.
#[async_trait]
pub trait CallFactory: Send + Sync {
    async fn connect(&self, events: mpsc::Sender<SessionEvent>) -> Result<Arc<dyn CallTransport>>;
}
