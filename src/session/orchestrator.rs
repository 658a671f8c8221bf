//! Session orchestration state machine.
//!
//! Owns the set of live peers, the local media stream, and every recording
//! episode. Reacts to signaling and call-transport events, issues view-update
//! and recording commands. Handlers execute to completion relative to each
//! other; the only interleaving points are their own awaits, so membership is
//! re-checked where a handler could observe a world changed under it.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::media::{MediaSource, StreamHandle};
use crate::recorder::{Recorder, RecordingKey};
use crate::signaling::{SignalingChannel, SignalingFactory};
use crate::transport::{CallFactory, CallHandle, CallTransport};
use crate::utils::error::Result;
use crate::view::{VideoSource, VideoSurface, ViewAdapter};

use super::events::{ParticipantId, SessionEvent};
use super::state::{PeerEntry, PeerSet, RecordingRegistry, SessionConfig};

/// Queue depth for the serialized session event loop.
const EVENT_QUEUE_DEPTH: usize = 64;

/// The state machine at the center of a room session.
pub struct SessionOrchestrator {
    config: SessionConfig,
    local_id: ParticipantId,
    local_stream: StreamHandle,
    peers: PeerSet,
    recordings: RecordingRegistry,
    /// Global recording flag. Read/written only here and in session-creation
    /// checks; toggled only by explicit UI intent.
    recording_enabled: bool,
    view: Arc<dyn ViewAdapter>,
    signaling: Arc<dyn SignalingChannel>,
    transport: Arc<dyn CallTransport>,
    events: mpsc::Receiver<SessionEvent>,
}

impl SessionOrchestrator {
    /// Set up a session: wire UI intents, acquire local media, connect the
    /// call transport, render self as participant #0, and join the signaling
    /// room.
    ///
    /// UI intents are bound before the first await so early interaction is
    /// never dropped. Media acquisition failure aborts the whole session and
    /// propagates to the caller.
    pub async fn initialize(
        config: SessionConfig,
        media: &dyn MediaSource,
        view: Arc<dyn ViewAdapter>,
        signaling_factory: &dyn SignalingFactory,
        call_factory: &dyn CallFactory,
    ) -> Result<Self> {
        let (event_tx, events) = mpsc::channel(EVENT_QUEUE_DEPTH);
        view.bind_intents(event_tx.clone());

        let local_stream = media.acquire().await?;
        let transport = call_factory.connect(event_tx.clone()).await?;
        let local_id = transport.local_id();
        tracing::info!(%local_id, room = %config.room, "local endpoint ready");

        view.render_video(VideoSurface {
            participant: local_id.clone(),
            source: VideoSource::Live(local_stream.clone()),
            is_self: true,
        })
        .await;

        let signaling = signaling_factory.connect(event_tx).await?;
        signaling.join(&config.room, &local_id).await?;
        tracing::info!(room = %config.room, "joined signaling room");

        Ok(Self {
            config,
            local_id,
            local_stream,
            peers: PeerSet::default(),
            recordings: RecordingRegistry::default(),
            recording_enabled: false,
            view,
            signaling,
            transport,
            events,
        })
    }

    /// Drain the event queue until every sender is dropped.
    pub async fn run(&mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle_event(event).await;
        }
        tracing::debug!("event queue closed, session loop exiting");
    }

    /// Dispatch one event to its handler.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::PeerConnected(peer) => self.on_peer_connected(peer).await,
            SessionEvent::PeerDisconnected(peer) => self.on_peer_disconnected(&peer).await,
            SessionEvent::IncomingCall(call) => self.on_incoming_call(call).await,
            SessionEvent::StreamReceived { call, stream } => {
                self.on_remote_stream_received(call, stream).await
            }
            SessionEvent::CallError { call, reason } => self.on_call_error(call, &reason).await,
            SessionEvent::CallClosed(call) => self.on_call_closed(&call),
            SessionEvent::TransportError(reason) => {
                tracing::error!(%reason, "transport error, session continues");
            }
            SessionEvent::RecordToggled(enabled) => self.on_record_toggled(enabled).await,
            SessionEvent::LeavePressed => self.on_leave_pressed().await,
        }
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local_id
    }

    /// Number of live remote participants. Always equals the peer set size.
    pub fn participant_count(&self) -> usize {
        self.peers.len()
    }

    pub fn contains_peer(&self, id: &ParticipantId) -> bool {
        self.peers.contains(id)
    }

    pub fn recording_enabled(&self) -> bool {
        self.recording_enabled
    }

    /// Total recording episodes ever created this session.
    pub fn recording_count(&self) -> usize {
        self.recordings.len()
    }

    pub fn active_recording_count(&self) -> usize {
        self.recordings.active_count()
    }

    /// Active episodes for one participant.
    pub fn active_recordings_for(&self, participant: &ParticipantId) -> usize {
        self.recordings
            .keys_for(participant)
            .iter()
            .filter(|k| {
                self.recordings
                    .get(k)
                    .map_or(false, Recorder::is_active)
            })
            .count()
    }

    /// A new room member was announced. Call out optimistically; the peer
    /// joins the live set only once a stream actually comes back, so a
    /// half-established call never shows up as a participant.
    pub async fn on_peer_connected(&mut self, peer: ParticipantId) {
        tracing::info!(%peer, "peer connected, placing call");
        match self.transport.place(&peer, self.local_stream.clone()).await {
            Ok(call) => tracing::debug!(%peer, call = %call.id(), "outbound call placed"),
            Err(e) => tracing::warn!(%peer, error = %e, "call placement failed"),
        }
    }

    /// Signaled disconnect. An unknown id is benign: the disconnect may have
    /// raced a teardown that already happened.
    pub async fn on_peer_disconnected(&mut self, peer: &ParticipantId) {
        let Some(entry) = self.peers.remove(peer) else {
            tracing::debug!(%peer, "disconnect for unknown peer ignored");
            return;
        };
        tracing::info!(%peer, "peer disconnected");

        if let Err(e) = self.transport.hang_up(&entry.call).await {
            tracing::warn!(%peer, error = %e, "hang up failed");
        }
        self.view.set_participant_count(self.peers.len()).await;
        // Live surface goes first so a view keying surfaces by participant id
        // cannot drop the playback entries surfaced next.
        self.view.remove_video(peer).await;
        self.stop_recording_for(peer).await;
    }

    /// Answer unconditionally with the local stream; membership control is the
    /// signaling relay's job, not the transport's.
    pub async fn on_incoming_call(&mut self, call: CallHandle) {
        tracing::info!(peer = %call.peer(), "answering incoming call");
        if let Err(e) = self.transport.answer(&call, self.local_stream.clone()).await {
            tracing::warn!(peer = %call.peer(), error = %e, "answer failed");
        }
    }

    /// First remote stream for a caller registers it as a live participant.
    /// Duplicate stream events for a known caller (renegotiation) are ignored:
    /// one surface, at most one recording session.
    pub async fn on_remote_stream_received(&mut self, call: CallHandle, stream: StreamHandle) {
        let caller = call.peer().clone();
        if self.peers.contains(&caller) {
            tracing::debug!(peer = %caller, "duplicate stream ignored");
            return;
        }

        // Register before the awaits below so a duplicate event serviced while
        // this handler is suspended cannot register twice.
        self.peers.insert(
            caller.clone(),
            PeerEntry {
                call,
                stream: stream.clone(),
                call_errors: 0,
            },
        );

        if self.recording_enabled && !self.recordings.has_active(&caller) {
            self.start_recording(&caller, stream.clone());
        }

        self.view
            .render_video(VideoSurface {
                participant: caller.clone(),
                source: VideoSource::Live(stream),
                is_self: false,
            })
            .await;
        self.view.set_participant_count(self.peers.len()).await;
        tracing::info!(peer = %caller, count = self.peers.len(), "participant registered");
    }

    /// A call error costs the peer its surface but not its room membership;
    /// the signaling relay stays the source of truth. A peer that exhausts
    /// its error budget is treated as disconnected.
    pub async fn on_call_error(&mut self, call: CallHandle, reason: &str) {
        let peer = call.peer().clone();
        tracing::warn!(%peer, reason, "call error");
        self.view.remove_video(&peer).await;

        let over_budget = match self.peers.get_mut(&peer) {
            Some(entry) => {
                entry.call_errors += 1;
                entry.call_errors >= self.config.call_error_budget
            }
            None => false,
        };
        if over_budget {
            tracing::warn!(
                %peer,
                budget = self.config.call_error_budget,
                "call error budget exhausted, dropping peer"
            );
            self.on_peer_disconnected(&peer).await;
        }
    }

    /// Observability only; closure does not imply the peer left the room.
    pub fn on_call_closed(&mut self, call: &CallHandle) {
        tracing::info!(peer = %call.peer(), "call closed");
    }

    /// Flip the global recording flag.
    ///
    /// On: start a fresh episode for every participant (self included) with a
    /// stream and no active episode. Off: stop every active episode and
    /// surface each one's artifacts via the view exactly once.
    pub async fn on_record_toggled(&mut self, enabled: bool) {
        self.recording_enabled = enabled;
        tracing::info!(enabled, "recording toggled");

        if enabled {
            let targets: Vec<(ParticipantId, StreamHandle)> = self
                .participants_with_streams()
                .into_iter()
                .filter(|(id, _)| !self.recordings.has_active(id))
                .collect();
            for (id, stream) in targets {
                self.start_recording(&id, stream);
            }
        } else {
            for key in self.recordings.active_keys() {
                self.finalize_session(&key).await;
            }
        }
    }

    /// Export every episode ever recorded this session. Active episodes are
    /// stopped first so their artifacts exist to export. Per-episode failures
    /// are logged and never abort siblings.
    pub async fn on_leave_pressed(&mut self) {
        tracing::info!(room = %self.config.room, "leaving room");

        for key in self.recordings.active_keys() {
            self.finalize_session(&key).await;
        }

        let mut failures = 0usize;
        for key in self.recordings.all_keys() {
            let Some(recorder) = self.recordings.get(&key) else {
                continue;
            };
            if let Err(e) = recorder.download(&self.config.download_dir) {
                failures += 1;
                tracing::error!(key = %key, error = %e, "artifact download failed");
            }
        }
        if failures > 0 {
            tracing::warn!(failures, "some artifact downloads failed");
        }

        if let Err(e) = self.signaling.leave().await {
            tracing::warn!(error = %e, "signaling leave failed");
        }
    }

    /// Stop every **active** episode for `participant` and surface its
    /// artifacts; historical stopped episodes are left untouched. Zero
    /// matching episodes is a no-op.
    pub async fn stop_recording_for(&mut self, participant: &ParticipantId) {
        for key in self.recordings.keys_for(participant) {
            self.finalize_session(&key).await;
        }
    }

    /// Self plus every live peer, each with its stream. The `is_self`
    /// distinction matters only at render time.
    fn participants_with_streams(&self) -> Vec<(ParticipantId, StreamHandle)> {
        let mut all = vec![(self.local_id.clone(), self.local_stream.clone())];
        all.extend(
            self.peers
                .iter()
                .map(|(id, entry)| (id.clone(), entry.stream.clone())),
        );
        all
    }

    fn start_recording(&mut self, participant: &ParticipantId, stream: StreamHandle) {
        let key = self.recordings.next_key(participant);
        let mut recorder = Recorder::new(key, stream, self.config.output_dir.clone());
        recorder.start();
        self.recordings.insert(recorder);
    }

    /// Stop one active episode and surface its artifacts as playable entries
    /// tagged with the participant's id. Inactive episodes are skipped.
    async fn finalize_session(&mut self, key: &RecordingKey) {
        let artifacts = {
            let Some(recorder) = self.recordings.get_mut(key) else {
                return;
            };
            if !recorder.is_active() {
                return;
            }
            match recorder.stop().await {
                Ok(artifacts) => artifacts,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "recording finalize failed");
                    return;
                }
            }
        };

        for artifact in artifacts {
            self.view
                .render_video(VideoSurface {
                    participant: key.participant().clone(),
                    source: VideoSource::Artifact(artifact),
                    is_self: key.participant() == &self.local_id,
                })
                .await;
        }
    }
}
