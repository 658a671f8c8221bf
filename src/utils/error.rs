//! Error types and handling
//!
//! Common error types used across the crate. Errors from a single participant's
//! call or recording never propagate to affect other participants.

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    /// Local camera/microphone could not be acquired. Fatal to session start;
    /// surfaced to the caller of `initialize`, never retried silently.
    #[error("media acquisition failed: {0}")]
    MediaAcquisition(String),

    #[error("call placement to {peer} failed: {reason}")]
    CallPlacement { peer: String, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("signaling error: {0}")]
    Signaling(String),

    /// Stopping/finalizing one recording episode failed. Collected during bulk
    /// operations, never aborts sibling sessions.
    #[error("recording finalize failed for {key}: {reason}")]
    RecordingFinalize { key: String, reason: String },

    #[error("artifact download failed for {key}: {reason}")]
    Download { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session event channel closed")]
    ChannelClosed,
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
