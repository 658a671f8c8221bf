//! Session orchestration module
//!
//! - [`SessionEvent`]: the serialized event vocabulary every boundary feeds into
//! - [`SessionOrchestrator`]: the state machine draining those events
//! - [`state`]: the orchestrator-owned peer set and recording registry

pub mod events;
pub mod orchestrator;
pub mod state;

pub use events::{ParticipantId, RoomId, SessionEvent};
pub use orchestrator::SessionOrchestrator;
pub use state::{PeerEntry, PeerSet, RecordingRegistry, SessionConfig};
