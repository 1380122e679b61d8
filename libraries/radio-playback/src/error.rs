//! Error types for playback management

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The platform could not open the stream
    #[error("Stream open failed: {0}")]
    Open(String),

    /// A play/pause/volume command on an open stream failed
    #[error("Stream command failed: {0}")]
    Command(String),

    /// Audio output device error
    #[error("Audio device error: {0}")]
    Device(String),

    /// The session runtime is no longer running
    #[error("Playback session has shut down")]
    ShutDown,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Substrings that mark a failure as connectivity related
const CONNECTIVITY_MARKERS: [&str; 3] = ["network", "connection", "timeout"];

/// Failure signal reported by the platform audio subsystem
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StreamFault {
    /// Platform-provided description
    pub message: String,
}

impl StreamFault {
    /// Create a fault from a platform message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Whether the message carries a network/connection/timeout marker
    ///
    /// Matching is case-insensitive.
    pub fn is_connectivity_related(&self) -> bool {
        let message = self.message.to_lowercase();
        CONNECTIVITY_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}

impl From<&PlaybackError> for StreamFault {
    fn from(err: &PlaybackError) -> Self {
        StreamFault::new(err.to_string())
    }
}
