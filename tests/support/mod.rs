//! Mock boundary implementations for exercising the orchestrator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use roomcast::{
    CallFactory, CallHandle, CallTransport, Error, MediaSource, ParticipantId, Result, RoomId,
    SessionConfig, SessionEvent, SessionOrchestrator, SignalingChannel, SignalingFactory,
    StreamHandle, VideoSource, VideoSurface, ViewAdapter,
};

/// Media source handing out one pre-built local stream.
pub struct StubMedia {
    stream: StreamHandle,
}

impl StubMedia {
    pub fn new() -> Self {
        Self {
            stream: StreamHandle::new("local-cam"),
        }
    }
}

#[async_trait]
impl MediaSource for StubMedia {
    async fn acquire(&self) -> Result<StreamHandle> {
        Ok(self.stream.clone())
    }
}

/// Media source whose device is always unavailable.
pub struct FailingMedia;

#[async_trait]
impl MediaSource for FailingMedia {
    async fn acquire(&self) -> Result<StreamHandle> {
        Err(Error::MediaAcquisition("camera unavailable".into()))
    }
}

/// One view command, in the order the orchestrator issued it.
#[derive(Clone)]
pub enum ViewOp {
    Rendered(VideoSurface),
    Removed(ParticipantId),
    Count(usize),
}

/// View adapter recording every command it receives.
#[derive(Default)]
pub struct RecordingView {
    pub rendered: Mutex<Vec<VideoSurface>>,
    pub removed: Mutex<Vec<ParticipantId>>,
    pub counts: Mutex<Vec<usize>>,
    pub ops: Mutex<Vec<ViewOp>>,
    pub intents: Mutex<Option<mpsc::Sender<SessionEvent>>>,
}

impl RecordingView {
    pub fn live_surfaces_for(&self, id: &ParticipantId) -> usize {
        self.rendered
            .lock()
            .iter()
            .filter(|s| &s.participant == id && matches!(s.source, VideoSource::Live(_)))
            .count()
    }

    pub fn artifact_surfaces_for(&self, id: &ParticipantId) -> Vec<VideoSurface> {
        self.rendered
            .lock()
            .iter()
            .filter(|s| &s.participant == id && matches!(s.source, VideoSource::Artifact(_)))
            .cloned()
            .collect()
    }

    pub fn last_count(&self) -> Option<usize> {
        self.counts.lock().last().copied()
    }

    pub fn intents_bound(&self) -> bool {
        self.intents.lock().is_some()
    }
}

#[async_trait]
impl ViewAdapter for RecordingView {
    fn bind_intents(&self, events: mpsc::Sender<SessionEvent>) {
        *self.intents.lock() = Some(events);
    }

    async fn render_video(&self, surface: VideoSurface) {
        self.ops.lock().push(ViewOp::Rendered(surface.clone()));
        self.rendered.lock().push(surface);
    }

    async fn remove_video(&self, participant: &ParticipantId) {
        self.ops.lock().push(ViewOp::Removed(participant.clone()));
        self.removed.lock().push(participant.clone());
    }

    async fn set_participant_count(&self, count: usize) {
        self.ops.lock().push(ViewOp::Count(count));
        self.counts.lock().push(count);
    }
}

/// Transport recording placed/answered/hung-up calls.
pub struct ScriptedTransport {
    local: ParticipantId,
    pub placed: Mutex<Vec<ParticipantId>>,
    pub answered: Mutex<Vec<CallHandle>>,
    pub hung_up: Mutex<Vec<CallHandle>>,
}

impl ScriptedTransport {
    pub fn new(local: ParticipantId) -> Self {
        Self {
            local,
            placed: Mutex::new(Vec::new()),
            answered: Mutex::new(Vec::new()),
            hung_up: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CallTransport for ScriptedTransport {
    fn local_id(&self) -> ParticipantId {
        self.local.clone()
    }

    async fn place(&self, peer: &ParticipantId, _stream: StreamHandle) -> Result<CallHandle> {
        self.placed.lock().push(peer.clone());
        Ok(CallHandle::new(peer.clone()))
    }

    async fn answer(&self, call: &CallHandle, _stream: StreamHandle) -> Result<()> {
        self.answered.lock().push(call.clone());
        Ok(())
    }

    async fn hang_up(&self, call: &CallHandle) -> Result<()> {
        self.hung_up.lock().push(call.clone());
        Ok(())
    }
}

pub struct ScriptedCallFactory {
    pub transport: Arc<ScriptedTransport>,
}

#[async_trait]
impl CallFactory for ScriptedCallFactory {
    async fn connect(
        &self,
        _events: mpsc::Sender<SessionEvent>,
    ) -> Result<Arc<dyn CallTransport>> {
        Ok(Arc::clone(&self.transport) as Arc<dyn CallTransport>)
    }
}

/// Signaling channel recording join/leave only.
#[derive(Default)]
pub struct NullSignaling {
    pub joined: Mutex<Vec<(RoomId, ParticipantId)>>,
    pub left: AtomicBool,
}

impl NullSignaling {
    pub fn has_left(&self) -> bool {
        self.left.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalingChannel for NullSignaling {
    async fn join(&self, room: &RoomId, local_id: &ParticipantId) -> Result<()> {
        self.joined.lock().push((room.clone(), local_id.clone()));
        Ok(())
    }

    async fn leave(&self) -> Result<()> {
        self.left.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct NullSignalingFactory {
    pub channel: Arc<NullSignaling>,
}

#[async_trait]
impl SignalingFactory for NullSignalingFactory {
    async fn connect(
        &self,
        _events: mpsc::Sender<SessionEvent>,
    ) -> Result<Arc<dyn SignalingChannel>> {
        Ok(Arc::clone(&self.channel) as Arc<dyn SignalingChannel>)
    }
}

/// An initialized orchestrator plus handles to every mock boundary.
pub struct Harness {
    pub orchestrator: SessionOrchestrator,
    pub view: Arc<RecordingView>,
    pub transport: Arc<ScriptedTransport>,
    pub signaling: Arc<NullSignaling>,
    pub output: tempfile::TempDir,
    pub downloads: tempfile::TempDir,
}

pub async fn harness() -> Harness {
    let output = tempfile::tempdir().unwrap();
    let downloads = tempfile::tempdir().unwrap();
    let config = SessionConfig::new("test-room", output.path(), downloads.path());

    let view = Arc::new(RecordingView::default());
    let transport = Arc::new(ScriptedTransport::new(ParticipantId::from("self")));
    let signaling = Arc::new(NullSignaling::default());

    let orchestrator = SessionOrchestrator::initialize(
        config,
        &StubMedia::new(),
        Arc::clone(&view) as Arc<dyn ViewAdapter>,
        &NullSignalingFactory {
            channel: Arc::clone(&signaling),
        },
        &ScriptedCallFactory {
            transport: Arc::clone(&transport),
        },
    )
    .await
    .unwrap();

    Harness {
        orchestrator,
        view,
        transport,
        signaling,
        output,
        downloads,
    }
}

/// Shorthand for the stream-received event a transport would emit.
pub fn stream_received(peer: &str) -> SessionEvent {
    SessionEvent::StreamReceived {
        call: CallHandle::new(ParticipantId::from(peer)),
        stream: StreamHandle::new(format!("{peer}-cam")),
    }
}
