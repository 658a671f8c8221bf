//! Session event vocabulary.
//!
//! Every external source (signaling relay, call transport, view intents) owns a
//! clone of one `mpsc` sender and funnels into a single queue of
//! [`SessionEvent`]s. The orchestrator task draining that queue is what
//! serializes handler execution onto one logical thread.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::media::StreamHandle;
use crate::transport::CallHandle;

/// Opaque participant identity, assigned by the call transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A signaling-scope group of participants who should all connect to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Events handled by the orchestrator, in arrival order.
///
/// Signaling events for a room arrive in broadcast order relative to each
/// other, but nothing orders a `PeerConnected` against the eventual
/// `StreamReceived` for the same peer; handlers are correct under any
/// interleaving.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The signaling relay announced a new room member.
    PeerConnected(ParticipantId),
    /// The signaling relay announced a member left.
    PeerDisconnected(ParticipantId),
    /// The call transport received an inbound call.
    IncomingCall(CallHandle),
    /// A remote stream arrived for an established call.
    StreamReceived {
        call: CallHandle,
        stream: StreamHandle,
    },
    /// A call failed. Not equivalent to a disconnect on its own.
    CallError { call: CallHandle, reason: String },
    /// A call ended cleanly. Observability only.
    CallClosed(CallHandle),
    /// The transport itself failed; individual calls report their own errors.
    TransportError(String),
    /// UI intent: the global recording flag changed.
    RecordToggled(bool),
    /// UI intent: leave the room, exporting every recording episode.
    LeavePressed,
}
