//! Media stream handles and the local capture boundary.
//!
//! Physical camera/microphone capture is out of scope; [`MediaSource`] is the
//! seam a real capture backend plugs into. A [`StreamHandle`] is the in-process
//! representation of a live stream: producers push timestamped chunks through
//! it, recorders and surfaces subscribe to it.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::utils::error::Result;

/// Buffered chunk capacity per stream before slow subscribers start lagging.
const STREAM_BUFFER_CHUNKS: usize = 256;

/// A single timestamped chunk of captured media.
#[derive(Debug, Clone)]
pub struct MediaChunk {
    pub data: Vec<u8>,
    pub timestamp_ms: i64,
}

impl MediaChunk {
    /// Create a chunk stamped with the current wall-clock time.
    pub fn now(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }
}

/// Cloneable handle to a live media stream.
///
/// All clones share the same underlying chunk channel; subscribing yields every
/// chunk pushed after the subscription, which is what a recorder attaching
/// mid-stream wants.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    id: Uuid,
    label: String,
    chunks: broadcast::Sender<MediaChunk>,
}

impl StreamHandle {
    pub fn new(label: impl Into<String>) -> Self {
        let (chunks, _) = broadcast::channel(STREAM_BUFFER_CHUNKS);
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            chunks,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Push a chunk to every subscriber. Chunks pushed with no subscriber are
    /// dropped, matching live-media semantics.
    pub fn push(&self, chunk: MediaChunk) {
        let _ = self.chunks.send(chunk);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaChunk> {
        self.chunks.subscribe()
    }
}

/// Local camera/microphone acquisition boundary.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Acquire the local stream.
    ///
    /// Fails with [`Error::MediaAcquisition`](crate::Error::MediaAcquisition)
    /// when the device is unavailable; callers propagate the failure rather
    /// than retrying.
    async fn acquire(&self) -> Result<StreamHandle>;
}
