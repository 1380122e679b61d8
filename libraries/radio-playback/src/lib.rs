//! Krushi Radio - Playback Session Management
//!
//! Platform-agnostic lifecycle management for a single live audio stream.
//!
//! This crate provides:
//! - The session state machine (Idle, Loading, Playing, Paused, Error)
//! - Stepped volume control (0.1 steps, 0.0-1.0)
//! - Error classification for stream failures
//! - Exponential reconnect backoff (1 s doubling, capped at 30 s)
//! - Network-aware pausing driven by connectivity updates
//! - A tokio runtime that serializes every input onto one task
//!
//! # Architecture
//!
//! `radio-playback` never touches audio hardware or sockets. The platform
//! audio API is provided through the `AudioPlatform` / `StreamHandle`
//! traits; the desktop build uses `radio-audio-desktop`.
//!
//! `SessionManager` is synchronous: it is fed inputs and emits
//! `SessionEvent`s. `SessionRuntime` owns a manager on a tokio task and
//! turns those events into real timers and snapshot updates.
//!
//! # Example: Driving the manager directly
//!
//! ```rust
//! use radio_playback::{
//!     AudioPlatform, OpenRequest, SessionConfig, SessionManager, SessionState,
//!     StatusCallback, StreamHandle, StreamId, StreamStatus,
//! };
//! use std::sync::Arc;
//!
//! struct SilentPlatform;
//! struct SilentHandle;
//!
//! impl AudioPlatform for SilentPlatform {
//!     fn open(
//!         &mut self,
//!         _request: OpenRequest,
//!         _on_status: StatusCallback,
//!     ) -> radio_playback::Result<Box<dyn StreamHandle>> {
//!         Ok(Box::new(SilentHandle))
//!     }
//! }
//!
//! impl StreamHandle for SilentHandle {
//!     fn play(&mut self) -> radio_playback::Result<()> { Ok(()) }
//!     fn pause(&mut self) -> radio_playback::Result<()> { Ok(()) }
//!     fn set_volume(&mut self, _volume: f32) -> radio_playback::Result<()> { Ok(()) }
//!     fn close(self: Box<Self>) {}
//! }
//!
//! let sink = Arc::new(|_: StreamId, _: StreamStatus| {});
//! let mut manager = SessionManager::new(SessionConfig::default(), Box::new(SilentPlatform), sink);
//!
//! manager.start();
//! assert_eq!(manager.state(), SessionState::Loading);
//!
//! // The platform reports the first stream (id 0) as loaded
//! manager.handle_stream_status(StreamId(0), StreamStatus::Loaded);
//! assert_eq!(manager.state(), SessionState::Playing);
//!
//! manager.volume_down();
//! assert_eq!(manager.volume(), 0.9);
//! ```
//!
//! # Example: Running a session
//!
//! ```rust,no_run
//! use radio_connectivity::{ConnectivityMonitor, TcpProbe};
//! use radio_playback::{AudioPlatform, SessionConfig, SessionRuntime};
//! use std::time::Duration;
//!
//! # async fn run(platform: Box<dyn AudioPlatform>) -> radio_playback::Result<()> {
//! let probe = TcpProbe::new("radioserver.krushiradio.lk:443", Duration::from_secs(3));
//! let (connectivity, _monitor) = ConnectivityMonitor::new(probe).spawn();
//!
//! let session = SessionRuntime::spawn(SessionConfig::default(), platform, connectivity);
//! session.toggle()?;
//!
//! let mut snapshots = session.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     println!("{:?}", snapshots.borrow().state);
//! }
//! session.shutdown().await
//! # }
//! ```

mod error;
mod events;
mod manager;
mod platform;
pub mod reconnect;
mod runtime;
pub mod station;
pub mod types;
mod volume;

// Public exports
pub use error::{PlaybackError, Result, StreamFault};
pub use events::SessionEvent;
pub use manager::SessionManager;
pub use platform::{AudioPlatform, OpenRequest, StatusCallback, StatusSink, StreamHandle, StreamStatus};
pub use reconnect::ReconnectPolicy;
pub use runtime::{Intent, SessionRuntime};
pub use types::{
    ErrorKind, RetryTicket, SessionConfig, SessionSnapshot, SessionState, StreamId,
    CONNECTION_LOST_MESSAGE,
};
pub use volume::{Volume, VOLUME_STEP};
