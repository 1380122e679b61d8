//! Session runtime
//!
//! Runs the `SessionManager` on a single tokio task. Listener intents,
//! platform callbacks, retry timers and connectivity updates are all
//! funnelled through one command channel, so the manager only ever sees
//! one input at a time. After each input the runtime drains the manager's
//! events, arms or aborts the retry timer, and publishes a fresh snapshot.

use crate::{
    error::{PlaybackError, Result},
    events::SessionEvent,
    manager::SessionManager,
    platform::{AudioPlatform, StatusSink, StreamStatus},
    types::{RetryTicket, SessionConfig, SessionSnapshot, StreamId},
};
use radio_connectivity::ConnectivityStatus;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Listener intent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Start,
    Pause,
    Toggle,
    VolumeUp,
    VolumeDown,
    SetVolume(f32),
}

enum Command {
    Intent(Intent),
    Stream(StreamId, StreamStatus),
    RetryDue(RetryTicket),
    Shutdown(oneshot::Sender<()>),
}

/// Armed reconnect timer
struct RetryTimer {
    ticket: RetryTicket,
    task: JoinHandle<()>,
}

/// Handle to a running playback session
///
/// Dropping it shuts the session down.
pub struct SessionRuntime {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl SessionRuntime {
    /// Spawn the session task on the current tokio runtime
    ///
    /// # Arguments
    /// * `config` - Session settings
    /// * `platform` - Platform audio API
    /// * `connectivity` - Status feed, usually from `ConnectivityMonitor::spawn`
    pub fn spawn(
        config: SessionConfig,
        platform: Box<dyn AudioPlatform>,
        connectivity: watch::Receiver<ConnectivityStatus>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let weak = commands.downgrade();

        let sink_tx = weak.clone();
        let status_sink: StatusSink = Arc::new(move |stream_id: StreamId, status: StreamStatus| {
            if let Some(tx) = sink_tx.upgrade() {
                let _ = tx.send(Command::Stream(stream_id, status));
            }
        });

        let manager = SessionManager::new(config, platform, status_sink);
        let (snapshot_tx, snapshots) = watch::channel(manager.snapshot());

        let task = tokio::spawn(run(manager, command_rx, weak, connectivity, snapshot_tx));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Queue a listener intent
    pub fn send(&self, intent: Intent) -> Result<()> {
        self.commands
            .send(Command::Intent(intent))
            .map_err(|_| PlaybackError::ShutDown)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Intent::Start)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Intent::Pause)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(Intent::Toggle)
    }

    pub fn volume_up(&self) -> Result<()> {
        self.send(Intent::VolumeUp)
    }

    pub fn volume_down(&self) -> Result<()> {
        self.send(Intent::VolumeDown)
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.send(Intent::SetVolume(volume))
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Shut the session down and wait for the task to finish
    ///
    /// Cancels any pending retry and closes the stream.
    pub async fn shutdown(self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Command::Shutdown(ack_tx))
            .map_err(|_| PlaybackError::ShutDown)?;
        ack_rx.await.map_err(|_| PlaybackError::ShutDown)?;

        drop(self.commands);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Session task ended abnormally");
        }
        Ok(())
    }
}

async fn run(
    mut manager: SessionManager,
    mut commands: mpsc::UnboundedReceiver<Command>,
    weak: mpsc::WeakUnboundedSender<Command>,
    mut connectivity: watch::Receiver<ConnectivityStatus>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    let mut timer: Option<RetryTimer> = None;
    let mut connectivity_open = true;

    let initial = *connectivity.borrow_and_update();
    manager.on_connectivity_change(initial);
    flush(&mut manager, &mut timer, &weak, &snapshots);

    loop {
        let mut ack = None;

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Intent(intent)) => apply_intent(&mut manager, intent),
                Some(Command::Stream(stream_id, status)) => {
                    manager.handle_stream_status(stream_id, status);
                }
                Some(Command::RetryDue(ticket)) => {
                    if timer.as_ref().is_some_and(|t| t.ticket == ticket) {
                        timer = None;
                    }
                    manager.on_retry_due(ticket);
                }
                Some(Command::Shutdown(tx)) => {
                    manager.shutdown();
                    ack = Some(tx);
                }
                None => manager.shutdown(),
            },
            changed = connectivity.changed(), if connectivity_open => match changed {
                Ok(()) => {
                    let status = *connectivity.borrow_and_update();
                    manager.on_connectivity_change(status);
                }
                Err(_) => {
                    debug!("Connectivity feed closed");
                    connectivity_open = false;
                }
            },
        }

        flush(&mut manager, &mut timer, &weak, &snapshots);

        if manager.is_shut_down() {
            if let Some(tx) = ack {
                let _ = tx.send(());
            }
            break;
        }
    }

    if let Some(timer) = timer.take() {
        timer.task.abort();
    }
    debug!("Session task stopped");
}

fn apply_intent(manager: &mut SessionManager, intent: Intent) {
    trace!(?intent, "Intent");
    match intent {
        Intent::Start => manager.start(),
        Intent::Pause => manager.pause(),
        Intent::Toggle => manager.toggle(),
        Intent::VolumeUp => manager.volume_up(),
        Intent::VolumeDown => manager.volume_down(),
        Intent::SetVolume(volume) => manager.set_volume(volume),
    }
}

/// Act on drained events and publish the snapshot if it changed
fn flush(
    manager: &mut SessionManager,
    timer: &mut Option<RetryTimer>,
    weak: &mpsc::WeakUnboundedSender<Command>,
    snapshots: &watch::Sender<SessionSnapshot>,
) {
    for event in manager.drain_events() {
        match event {
            SessionEvent::RetryScheduled { ticket, delay, .. } => {
                if let Some(old) = timer.take() {
                    old.task.abort();
                }
                let weak = weak.clone();
                let task = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(tx) = weak.upgrade() {
                        let _ = tx.send(Command::RetryDue(ticket));
                    }
                });
                *timer = Some(RetryTimer { ticket, task });
            }
            SessionEvent::RetryCancelled { ticket } => {
                if timer.as_ref().is_some_and(|t| t.ticket == ticket) {
                    if let Some(old) = timer.take() {
                        old.task.abort();
                    }
                }
            }
            other => trace!(event = ?other, "Session event"),
        }
    }

    let snapshot = manager.snapshot();
    snapshots.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}
