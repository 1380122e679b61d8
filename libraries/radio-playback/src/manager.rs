//! Playback session manager - core orchestration
//!
//! Owns the single stream handle and drives the session through
//! Idle → Loading → Playing ⇄ Paused, with Error reachable from any of them.
//! Failures are classified and fed to the reconnect policy.
//!
//! The manager is synchronous and performs no I/O of its own. Platform
//! callbacks, retry timers and connectivity updates are fed in by the
//! caller (normally `SessionRuntime`), and timer requests come back out as
//! `SessionEvent`s via `drain_events()`.

use crate::{
    error::StreamFault,
    events::SessionEvent,
    platform::{AudioPlatform, OpenRequest, StatusCallback, StatusSink, StreamHandle, StreamStatus},
    reconnect::ReconnectPolicy,
    station::STREAM_URL,
    types::{ErrorKind, RetryTicket, SessionConfig, SessionSnapshot, SessionState, StreamId},
    volume::Volume,
};
use radio_connectivity::ConnectivityStatus;
use tracing::{debug, info, warn};

/// Playback session manager
///
/// One instance per application run. All mutation goes through its
/// methods; observers read `snapshot()` or drain events.
pub struct SessionManager {
    platform: Box<dyn AudioPlatform>,
    status_sink: StatusSink,

    state: SessionState,
    last_error: Option<ErrorKind>,
    volume: Volume,
    reconnect: ReconnectPolicy,
    connectivity: ConnectivityStatus,
    connection_lost: bool,

    /// At most one open stream
    handle: Option<Box<dyn StreamHandle>>,
    stream_id: Option<StreamId>,
    next_stream_id: u64,

    /// The listener's last intent was to play
    wants_playback: bool,

    pending_retry: Option<RetryTicket>,
    next_ticket: u64,

    shut_down: bool,

    pending_events: Vec<SessionEvent>,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// # Arguments
    /// * `config` - Session settings
    /// * `platform` - Platform audio API used to open the stream
    /// * `status_sink` - Receives every stream status, tagged with the stream it came from
    pub fn new(
        config: SessionConfig,
        platform: Box<dyn AudioPlatform>,
        status_sink: StatusSink,
    ) -> Self {
        Self {
            platform,
            status_sink,
            state: SessionState::Idle,
            last_error: None,
            volume: Volume::new(config.initial_volume),
            reconnect: ReconnectPolicy::new(),
            connectivity: ConnectivityStatus::unknown(),
            connection_lost: false,
            handle: None,
            stream_id: None,
            next_stream_id: 0,
            wants_playback: false,
            pending_retry: None,
            next_ticket: 0,
            shut_down: false,
            pending_events: Vec::new(),
        }
    }

    // ===== Playback Control =====

    /// Start (or resume) playback
    ///
    /// No-op while Loading or Playing. Supersedes any pending retry.
    pub fn start(&mut self) {
        if self.shut_down {
            return;
        }

        if matches!(self.state, SessionState::Loading | SessionState::Playing) {
            debug!(state = ?self.state, "Start ignored");
            return;
        }

        self.wants_playback = true;
        self.cancel_retry();
        self.attempt_start();
    }

    /// Pause playback
    ///
    /// Only valid while Playing with an open stream; otherwise a no-op.
    pub fn pause(&mut self) {
        if self.shut_down || self.state != SessionState::Playing {
            return;
        }

        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        let result = handle.pause();
        self.wants_playback = false;
        self.cancel_retry();

        if let Err(err) = result {
            warn!(error = %err, "Pause command failed, releasing stream");
            self.release_handle();
        }

        self.set_state(SessionState::Paused, None);
    }

    /// Pause if Playing, otherwise start
    pub fn toggle(&mut self) {
        if self.state == SessionState::Playing {
            self.pause();
        } else {
            self.start();
        }
    }

    // ===== Volume Control =====

    /// Set volume (0.0-1.0), snapped to 0.1 steps
    ///
    /// Applied to the open stream if there is one; stored either way.
    pub fn set_volume(&mut self, volume: f32) {
        if !self.shut_down && self.volume.set(volume) {
            self.volume_changed();
        }
    }

    /// Raise volume by one 0.1 step
    pub fn volume_up(&mut self) {
        if !self.shut_down && self.volume.increase() {
            self.volume_changed();
        }
    }

    /// Lower volume by one 0.1 step
    pub fn volume_down(&mut self) {
        if !self.shut_down && self.volume.decrease() {
            self.volume_changed();
        }
    }

    fn volume_changed(&mut self) {
        let volume = self.volume.value();

        if let Some(handle) = self.handle.as_mut() {
            if let Err(err) = handle.set_volume(volume) {
                warn!(error = %err, "Failed to apply volume to stream");
            }
        }

        debug!(volume, "Volume changed");
        self.pending_events
            .push(SessionEvent::VolumeChanged { volume });
    }

    // ===== External Signals =====

    /// Handle a status callback from the platform
    ///
    /// Statuses from a stream that has already been released are ignored.
    pub fn handle_stream_status(&mut self, stream_id: StreamId, status: StreamStatus) {
        if self.shut_down || self.stream_id != Some(stream_id) {
            debug!(?stream_id, ?status, "Ignoring status from stale stream");
            return;
        }

        match status {
            StreamStatus::Loaded => {
                if self.state == SessionState::Loading {
                    self.enter_playing();
                } else {
                    debug!(state = ?self.state, "Ignoring late load notification");
                }
            }
            StreamStatus::Error(fault) => self.on_playback_fault(fault),
        }
    }

    /// Handle a failure reported by the open stream
    ///
    /// During Loading the fault is classified as a load failure; after the
    /// stream was playing it becomes `PlaybackFault`. Either way the stream
    /// is released and the reconnect policy takes over. A fault while
    /// Paused only releases the stream.
    pub fn on_playback_fault(&mut self, fault: StreamFault) {
        if self.shut_down {
            return;
        }

        warn!(state = ?self.state, fault = %fault, "Stream fault");
        self.release_handle();

        match self.state {
            SessionState::Loading => self.enter_error(ErrorKind::for_load_failure(&fault)),
            SessionState::Playing => self.enter_error(ErrorKind::PlaybackFault),
            SessionState::Idle | SessionState::Paused | SessionState::Error => {}
        }
    }

    /// Apply a new connectivity status
    ///
    /// Losing reachability while Playing pauses the stream and enters
    /// Error(NetworkUnavailable). Regaining it arms a parked reconnect.
    pub fn on_connectivity_change(&mut self, status: ConnectivityStatus) {
        if self.shut_down || status == self.connectivity {
            return;
        }

        let was_reachable = self.connectivity.reachable;
        self.connectivity = status;
        self.pending_events
            .push(SessionEvent::ConnectivityChanged { status });

        if !status.reachable {
            if self.state == SessionState::Playing {
                info!("Network lost while playing");
                if let Some(handle) = self.handle.as_mut() {
                    if let Err(err) = handle.pause() {
                        warn!(error = %err, "Failed to pause stream after network loss");
                    }
                }
                self.enter_error(ErrorKind::NetworkUnavailable);
                self.connection_lost = true;
            }
        } else if !was_reachable && self.state == SessionState::Error {
            info!("Network restored");
            self.schedule_reconnect();
        }
    }

    /// A reconnect timer fired
    ///
    /// Ignored unless `ticket` is the currently pending retry.
    pub fn on_retry_due(&mut self, ticket: RetryTicket) {
        if self.shut_down || self.pending_retry != Some(ticket) {
            debug!(?ticket, "Ignoring stale retry");
            return;
        }

        self.pending_retry = None;

        if self.state != SessionState::Error || !self.wants_playback {
            return;
        }

        info!(attempt = self.reconnect.attempts(), "Reconnecting");
        self.attempt_start();
    }

    /// Tear the session down
    ///
    /// Cancels the pending retry and releases the stream. Every later call
    /// is a no-op.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }

        self.wants_playback = false;
        self.cancel_retry();
        self.release_handle();
        self.shut_down = true;
        info!("Playback session shut down");
    }

    // ===== Events & Observation =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Whether there are events waiting to be drained
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Read-only projection of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            volume: self.volume.value(),
            last_error: self.last_error,
            reconnect_attempts: self.reconnect.attempts(),
            connectivity: self.connectivity,
            retry_pending: self.pending_retry.is_some(),
            connection_lost: self.connection_lost,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Current volume (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.volume.value()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect.attempts()
    }

    pub fn connectivity(&self) -> ConnectivityStatus {
        self.connectivity
    }

    /// Ticket of the scheduled reconnect, if any
    pub fn pending_retry(&self) -> Option<RetryTicket> {
        self.pending_retry
    }

    /// Whether a stream handle is currently held
    pub fn has_stream(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // ===== Internal =====

    fn attempt_start(&mut self) {
        if !self.connectivity.reachable {
            self.release_handle();
            self.enter_error(ErrorKind::NetworkUnavailable);
            return;
        }

        if self.state == SessionState::Paused {
            if let Some(handle) = self.handle.as_mut() {
                match handle.play() {
                    Ok(()) => {
                        self.enter_playing();
                        return;
                    }
                    Err(err) => {
                        warn!(error = %err, "Resume failed, reopening stream");
                    }
                }
            }
        }

        self.release_handle();
        self.open_stream();
    }

    fn open_stream(&mut self) {
        let stream_id = StreamId(self.next_stream_id);
        self.next_stream_id += 1;

        self.set_state(SessionState::Loading, None);

        let sink = self.status_sink.clone();
        let on_status: StatusCallback = Box::new(move |status: StreamStatus| sink(stream_id, status));
        let request = OpenRequest {
            uri: STREAM_URL.to_string(),
            start_playing: true,
            initial_volume: self.volume.value(),
        };

        debug!(?stream_id, uri = %request.uri, "Opening stream");

        match self.platform.open(request, on_status) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.stream_id = Some(stream_id);
            }
            Err(err) => {
                let fault = StreamFault::from(&err);
                warn!(error = %err, "Failed to open stream");
                self.enter_error(ErrorKind::for_load_failure(&fault));
            }
        }
    }

    fn enter_playing(&mut self) {
        self.connection_lost = false;
        self.reconnect.reset();
        self.cancel_retry();
        self.set_state(SessionState::Playing, None);
        info!("Playing");
    }

    fn enter_error(&mut self, kind: ErrorKind) {
        self.connection_lost = false;
        self.set_state(SessionState::Error, Some(kind));
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if !self.wants_playback
            || self.pending_retry.is_some()
            || self.state != SessionState::Error
        {
            return;
        }

        if !self.connectivity.reachable {
            debug!("Network unreachable, reconnect parked");
            return;
        }

        let delay = self.reconnect.next_delay();
        let ticket = RetryTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending_retry = Some(ticket);

        let attempt = self.reconnect.attempts();
        info!(attempt, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
        self.pending_events.push(SessionEvent::RetryScheduled {
            ticket,
            delay,
            attempt,
        });
    }

    fn cancel_retry(&mut self) {
        if let Some(ticket) = self.pending_retry.take() {
            debug!(?ticket, "Reconnect cancelled");
            self.pending_events
                .push(SessionEvent::RetryCancelled { ticket });
        }
    }

    fn release_handle(&mut self) {
        self.stream_id = None;
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }

    fn set_state(&mut self, state: SessionState, error: Option<ErrorKind>) {
        if self.state == state && self.last_error == error {
            return;
        }

        debug!(from = ?self.state, to = ?state, ?error, "State transition");
        self.state = state;
        self.last_error = error;
        self.pending_events
            .push(SessionEvent::StateChanged { state, error });
    }
}
