//! Chunk capture for one participant's recording episode.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use crate::media::{MediaChunk, StreamHandle};
use crate::utils::error::{Error, Result};

use super::state::{ArtifactLocator, RecordingKey, RecordingState};

/// Captures one participant's stream into timestamped chunks for one episode.
///
/// `start` spawns a capture task subscribed to the stream; `stop` joins it and
/// finalizes the accumulated chunks into a file under the output directory.
/// Chunks still in flight at the moment of stop may be dropped.
pub struct Recorder {
    key: RecordingKey,
    stream: StreamHandle,
    output_dir: PathBuf,
    state: RecordingState,
    buffer: Arc<Mutex<Vec<MediaChunk>>>,
    stop_tx: Option<oneshot::Sender<()>>,
    capture: Option<JoinHandle<()>>,
    artifacts: Vec<ArtifactLocator>,
}

impl Recorder {
    pub fn new(key: RecordingKey, stream: StreamHandle, output_dir: PathBuf) -> Self {
        Self {
            key,
            stream,
            output_dir,
            state: RecordingState::Idle,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stop_tx: None,
            capture: None,
            artifacts: Vec::new(),
        }
    }

    pub fn key(&self) -> &RecordingKey {
        &self.key
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RecordingState::Active
    }

    /// Every artifact finalized so far for this episode.
    pub fn artifacts(&self) -> &[ArtifactLocator] {
        &self.artifacts
    }

    /// Start capturing. No-op when already active; a stopped episode never
    /// restarts.
    pub fn start(&mut self) {
        if self.state != RecordingState::Idle {
            return;
        }

        let mut rx = self.stream.subscribe();
        let buffer = Arc::clone(&self.buffer);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let capture = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    chunk = rx.recv() => match chunk {
                        Ok(chunk) => buffer.lock().push(chunk),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "recorder lagged behind stream");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        self.stop_tx = Some(stop_tx);
        self.capture = Some(capture);
        self.state = RecordingState::Active;
        tracing::info!(key = %self.key, "recording started");
    }

    /// Stop capturing and finalize the accumulated chunks into an artifact.
    ///
    /// Returns the artifacts produced by this stop. Stopping a non-active
    /// recorder is a no-op returning no new artifacts.
    pub async fn stop(&mut self) -> Result<Vec<ArtifactLocator>> {
        if self.state != RecordingState::Active {
            return Ok(Vec::new());
        }

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(capture) = self.capture.take() {
            capture.await.map_err(|e| Error::RecordingFinalize {
                key: self.key.to_string(),
                reason: e.to_string(),
            })?;
        }
        self.state = RecordingState::Stopped;

        let chunks = std::mem::take(&mut *self.buffer.lock());
        let mut data = Vec::new();
        for chunk in &chunks {
            data.extend_from_slice(&chunk.data);
        }

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}.bin", self.key.file_stem()));
        fs::write(&path, &data).map_err(|e| Error::RecordingFinalize {
            key: self.key.to_string(),
            reason: e.to_string(),
        })?;

        let locator = ArtifactLocator::from(path);
        self.artifacts.push(locator.clone());
        tracing::info!(key = %self.key, chunks = chunks.len(), bytes = data.len(), "recording stopped");
        Ok(vec![locator])
    }

    /// Export every finalized artifact of this episode into `download_dir`.
    pub fn download(&self, download_dir: &Path) -> Result<Vec<ArtifactLocator>> {
        if self.artifacts.is_empty() {
            return Ok(Vec::new());
        }

        fs::create_dir_all(download_dir).map_err(|e| Error::Download {
            key: self.key.to_string(),
            reason: e.to_string(),
        })?;

        let mut exported = Vec::new();
        for artifact in &self.artifacts {
            let name = artifact.path().file_name().ok_or_else(|| Error::Download {
                key: self.key.to_string(),
                reason: format!("artifact has no file name: {artifact}"),
            })?;
            let dest = download_dir.join(name);
            fs::copy(artifact.path(), &dest).map_err(|e| Error::Download {
                key: self.key.to_string(),
                reason: e.to_string(),
            })?;
            exported.push(ArtifactLocator::from(dest));
        }
        tracing::info!(key = %self.key, count = exported.len(), "artifacts exported");
        Ok(exported)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(capture) = self.capture.take() {
            capture.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::ParticipantId;

    fn recorder_in(dir: &Path) -> (Recorder, StreamHandle) {
        let stream = StreamHandle::new("cam");
        let key = RecordingKey::new(ParticipantId::from("alice"), 0);
        let recorder = Recorder::new(key, stream.clone(), dir.to_path_buf());
        (recorder, stream)
    }

    #[tokio::test]
    async fn captures_pushed_chunks_into_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, stream) = recorder_in(dir.path());

        recorder.start();
        assert!(recorder.is_active());

        stream.push(MediaChunk::now(vec![1, 2, 3]));
        stream.push(MediaChunk::now(vec![4, 5]));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let artifacts = recorder.stop().await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(recorder.state(), RecordingState::Stopped);

        let data = fs::read(artifacts[0].path()).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn stop_without_start_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _stream) = recorder_in(dir.path());

        let artifacts = recorder.stop().await.unwrap();
        assert!(artifacts.is_empty());
        assert_eq!(recorder.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn stopped_episode_never_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _stream) = recorder_in(dir.path());

        recorder.start();
        recorder.stop().await.unwrap();

        recorder.start();
        assert_eq!(recorder.state(), RecordingState::Stopped);

        // A second stop adds no artifacts either.
        let again = recorder.stop().await.unwrap();
        assert!(again.is_empty());
        assert_eq!(recorder.artifacts().len(), 1);
    }

    #[tokio::test]
    async fn download_copies_artifacts() {
        let out = tempfile::tempdir().unwrap();
        let downloads = tempfile::tempdir().unwrap();
        let (mut recorder, stream) = recorder_in(out.path());

        recorder.start();
        stream.push(MediaChunk::now(vec![9]));
        tokio::time::sleep(Duration::from_millis(50)).await;
        recorder.stop().await.unwrap();

        let exported = recorder.download(downloads.path()).unwrap();
        assert_eq!(exported.len(), 1);
        assert!(exported[0].path().starts_with(downloads.path()));
        assert_eq!(fs::read(exported[0].path()).unwrap(), vec![9]);
    }
}
