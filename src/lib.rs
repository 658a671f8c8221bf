//! Roomcast - session orchestration for small multi-party video rooms.
//!
//! Participants discover each other through a signaling relay, establish direct
//! peer media sessions, and optionally record each participant's stream locally
//! for later playback. The heart of the crate is [`SessionOrchestrator`], an
//! event-driven state machine that reacts to connection/disconnection events,
//! drives peer-call setup and teardown, and keeps view and recording state
//! consistent with a fluctuating set of live peers.
//!
//! The signaling relay, media capture, call transport, and rendering layers are
//! expressed as trait boundaries in [`signaling`], [`media`], [`transport`],
//! and [`view`].

pub mod media;
pub mod recorder;
pub mod session;
pub mod signaling;
pub mod transport;
pub mod utils;
pub mod view;

pub use media::{MediaChunk, MediaSource, StreamHandle};
pub use recorder::{ArtifactLocator, Recorder, RecordingKey, RecordingState};
pub use session::{ParticipantId, RoomId, SessionConfig, SessionEvent, SessionOrchestrator};
pub use signaling::{SignalingChannel, SignalingFactory};
pub use transport::{CallFactory, CallHandle, CallTransport};
pub use utils::error::{Error, Result};
pub use view::{VideoSource, VideoSurface, ViewAdapter};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for binaries and examples.
///
/// Honors `RUST_LOG`; defaults to debug output for this crate.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomcast=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
