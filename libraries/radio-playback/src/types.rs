//! Core types for session management

use crate::error::StreamFault;
use radio_connectivity::ConnectivityStatus;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No stream requested yet
    Idle,

    /// Stream requested, waiting for the platform to report it loaded
    Loading,

    /// Stream open and audible
    Playing,

    /// Stream open but paused by the user
    Paused,

    /// Last request failed; see `last_error`
    Error,
}

/// Classified failure surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No connectivity at request time (or lost while playing)
    NetworkUnavailable,

    /// Transport failure while loading the stream
    NetworkError,

    /// Non-network failure to open the stream
    StreamLoadError,

    /// Error reported after the stream was open
    PlaybackFault,
}

impl ErrorKind {
    /// Classify a failure that happened before the stream finished loading
    pub fn for_load_failure(fault: &StreamFault) -> Self {
        if fault.is_connectivity_related() {
            ErrorKind::NetworkError
        } else {
            ErrorKind::StreamLoadError
        }
    }

    /// Short human-readable message for the listener
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::NetworkUnavailable => {
                "Network connection unavailable. Please check your connection and try again."
            }
            ErrorKind::NetworkError => "Network error. Attempting to reconnect...",
            ErrorKind::StreamLoadError => "Failed to load stream. Please try again.",
            ErrorKind::PlaybackFault => "An error occurred during playback",
        }
    }
}

/// Shown instead of the unavailable message when playback was interrupted
pub const CONNECTION_LOST_MESSAGE: &str = "Network connection lost. Waiting to reconnect...";

/// Identifies one opened stream; callbacks from older streams are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub u64);

/// Identifies one scheduled reconnect; superseded tickets are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetryTicket(pub u64);

/// Configuration for the session manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial volume (0.0-1.0, default: 1.0), snapped to 0.1 steps
    pub initial_volume: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
        }
    }
}

/// Read-only projection of the session for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub volume: f32,
    pub last_error: Option<ErrorKind>,
    pub reconnect_attempts: u32,
    pub connectivity: ConnectivityStatus,
    pub retry_pending: bool,

    /// Network dropped while the stream was playing
    pub connection_lost: bool,
}

impl SessionSnapshot {
    /// Message to show under the play control, if any
    pub fn status_message(&self) -> Option<&'static str> {
        match self.last_error {
            Some(ErrorKind::NetworkUnavailable) if self.connection_lost => {
                Some(CONNECTION_LOST_MESSAGE)
            }
            kind => kind.map(ErrorKind::message),
        }
    }

    /// Loading indicator visible
    pub fn is_buffering(&self) -> bool {
        self.state == SessionState::Loading
    }

    /// Play control is disabled while loading
    pub fn controls_enabled(&self) -> bool {
        self.state != SessionState::Loading
    }

    /// Volume as a whole percentage
    pub fn volume_percent(&self) -> u8 {
        (self.volume * 100.0).round() as u8
    }
}
