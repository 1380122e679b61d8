//! Desktop stream playback for Krushi Radio
//!
//! Implements the `radio_playback::AudioPlatform` API on desktop:
//!
//! - HTTP streaming with reqwest on a background thread
//! - MP3 decoding with symphonia
//! - Sample rate conversion with rubato when the device rate differs
//! - Output through CPAL on the default device
//!
//! # Example
//!
//! ```no_run
//! use radio_audio_desktop::DesktopAudioPlatform;
//! use radio_playback::{SessionConfig, SessionRuntime};
//! use radio_connectivity::ConnectivityStatus;
//! use tokio::sync::watch;
//!
//! # async fn run() -> radio_playback::Result<()> {
//! let (_tx, connectivity) = watch::channel(ConnectivityStatus::unknown());
//! let session = SessionRuntime::spawn(
//!     SessionConfig::default(),
//!     Box::new(DesktopAudioPlatform::new()),
//!     connectivity,
//! );
//! session.start()?;
//! # Ok(())
//! # }
//! ```

mod control;
mod convert;
pub mod download;
mod error;
mod output;
mod platform;

pub use error::{AudioError, Result};
pub use platform::{DesktopAudioPlatform, DesktopStreamHandle};
