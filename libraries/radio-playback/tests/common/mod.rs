//! Shared test doubles for the playback platform

#![allow(dead_code)]

use radio_connectivity::ConnectivityStatus;
use radio_playback::{
    AudioPlatform, OpenRequest, PlaybackError, RetryTicket, SessionConfig, SessionEvent,
    SessionManager, StatusCallback, StreamHandle, StreamId, StreamStatus,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Command issued to a mock stream handle
#[derive(Debug, Clone, PartialEq)]
pub enum HandleCommand {
    Play,
    Pause,
    SetVolume(f32),
    Close,
}

/// Everything the mock platform observed
#[derive(Default)]
pub struct PlatformLog {
    pub opened: Vec<OpenRequest>,
    pub callbacks: Vec<StatusCallback>,
    /// (stream index, command)
    pub commands: Vec<(usize, HandleCommand)>,
    /// Error message for the next `open` call
    pub fail_next_open: Option<String>,
}

impl PlatformLog {
    pub fn closed(&self, index: usize) -> usize {
        self.commands
            .iter()
            .filter(|(i, c)| *i == index && *c == HandleCommand::Close)
            .count()
    }

    pub fn total_closed(&self) -> usize {
        self.commands
            .iter()
            .filter(|(_, c)| *c == HandleCommand::Close)
            .count()
    }

    pub fn commands_for(&self, index: usize) -> Vec<HandleCommand> {
        self.commands
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct MockPlatform {
    pub log: Arc<Mutex<PlatformLog>>,
}

struct MockHandle {
    index: usize,
    log: Arc<Mutex<PlatformLog>>,
}

impl AudioPlatform for MockPlatform {
    fn open(
        &mut self,
        request: OpenRequest,
        on_status: StatusCallback,
    ) -> radio_playback::Result<Box<dyn StreamHandle>> {
        let mut log = self.log.lock().unwrap();
        if let Some(message) = log.fail_next_open.take() {
            return Err(PlaybackError::Open(message));
        }

        let index = log.opened.len();
        log.opened.push(request);
        log.callbacks.push(on_status);

        Ok(Box::new(MockHandle {
            index,
            log: self.log.clone(),
        }))
    }
}

impl MockHandle {
    fn record(&self, command: HandleCommand) {
        self.log.lock().unwrap().commands.push((self.index, command));
    }
}

impl StreamHandle for MockHandle {
    fn play(&mut self) -> radio_playback::Result<()> {
        self.record(HandleCommand::Play);
        Ok(())
    }

    fn pause(&mut self) -> radio_playback::Result<()> {
        self.record(HandleCommand::Pause);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> radio_playback::Result<()> {
        self.record(HandleCommand::SetVolume(volume));
        Ok(())
    }

    fn close(self: Box<Self>) {
        self.record(HandleCommand::Close);
    }
}

/// Manager wired to a mock platform, with statuses routed back through
/// an inbox the way the runtime does it
pub struct Harness {
    pub manager: SessionManager,
    pub platform: MockPlatform,
    inbox: Arc<Mutex<VecDeque<(StreamId, StreamStatus)>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let platform = MockPlatform::default();
        let inbox: Arc<Mutex<VecDeque<(StreamId, StreamStatus)>>> = Arc::default();

        let sink_inbox = inbox.clone();
        let manager = SessionManager::new(
            config,
            Box::new(platform.clone()),
            Arc::new(move |id: StreamId, status: StreamStatus| {
                sink_inbox.lock().unwrap().push_back((id, status));
            }),
        );

        Self {
            manager,
            platform,
            inbox,
        }
    }

    /// Report a status from the `index`-th opened stream and deliver it
    pub fn report(&mut self, index: usize, status: StreamStatus) {
        {
            let log = self.platform.log.lock().unwrap();
            (log.callbacks[index])(status);
        }
        self.pump();
    }

    pub fn pump(&mut self) {
        loop {
            let next = self.inbox.lock().unwrap().pop_front();
            match next {
                Some((id, status)) => self.manager.handle_stream_status(id, status),
                None => break,
            }
        }
    }

    /// Start and report the newest stream as loaded
    pub fn play(&mut self) {
        self.manager.start();
        let index = self.opened() - 1;
        self.report(index, StreamStatus::Loaded);
    }

    pub fn opened(&self) -> usize {
        self.platform.log.lock().unwrap().opened.len()
    }

    pub fn fail_next_open(&self, message: &str) {
        self.platform.log.lock().unwrap().fail_next_open = Some(message.to_string());
    }

    pub fn go_offline(&mut self) {
        self.manager
            .on_connectivity_change(ConnectivityStatus::offline());
    }

    pub fn go_online(&mut self) {
        self.manager
            .on_connectivity_change(ConnectivityStatus::unknown());
    }
}

/// The last retry scheduled among `events`
pub fn scheduled_retry(events: &[SessionEvent]) -> Option<(RetryTicket, Duration, u32)> {
    events.iter().rev().find_map(|event| match event {
        SessionEvent::RetryScheduled {
            ticket,
            delay,
            attempt,
        } => Some((*ticket, *delay, *attempt)),
        _ => None,
    })
}
