//! Platform audio abstraction
//!
//! The session manager never touches audio devices or sockets directly.
//! Each platform (desktop, mobile) implements `AudioPlatform` to open the
//! live stream and hands back a `StreamHandle` for play/pause/volume.
//! Load completion and failures arrive later through the status callback.

use crate::error::{Result, StreamFault};
use crate::types::StreamId;
use std::sync::Arc;

/// Parameters for opening a stream
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRequest {
    /// Stream endpoint
    pub uri: String,

    /// Begin playback as soon as the stream is loaded
    pub start_playing: bool,

    /// Volume to apply before the first sample is played (0.0-1.0)
    pub initial_volume: f32,
}

/// Status reported by an open stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamStatus {
    /// The stream finished loading and is producing audio
    Loaded,

    /// The stream failed (before or after loading)
    Error(StreamFault),
}

/// Per-stream status callback handed to the platform
///
/// May be invoked from any thread.
pub type StatusCallback = Box<dyn Fn(StreamStatus) + Send + Sync>;

/// Session-wide status sink; the manager tags each stream's callback with
/// its `StreamId` before handing it to the platform
pub type StatusSink = Arc<dyn Fn(StreamId, StreamStatus) + Send + Sync>;

/// Platform audio API
pub trait AudioPlatform: Send {
    /// Begin opening a stream
    ///
    /// Returns immediately. An `Err` means the stream could not even be
    /// requested; otherwise the outcome is reported through `on_status`.
    fn open(&mut self, request: OpenRequest, on_status: StatusCallback)
        -> Result<Box<dyn StreamHandle>>;
}

/// Handle to one open stream
pub trait StreamHandle: Send {
    /// Resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the connection
    fn pause(&mut self) -> Result<()>;

    /// Set output volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Release the stream and every resource it holds
    fn close(self: Box<Self>);
}
