//! Krushi Radio - Connectivity Monitoring
//!
//! Polls the platform network-status API on a fixed interval and classifies
//! reachability for the playback session.
//!
//! This crate provides:
//! - Raw connection types and their coarse quality hints
//! - The `NetworkStatusProvider` trait implemented per platform
//! - A TCP reachability probe for desktop builds
//! - `ConnectivityMonitor`, which publishes status changes over a `watch` channel
//!
//! # Example
//!
//! ```rust,no_run
//! use radio_connectivity::{ConnectivityMonitor, TcpProbe};
//! use std::time::Duration;
//!
//! # async fn run() {
//! let probe = TcpProbe::new("radioserver.krushiradio.lk:443", Duration::from_secs(3));
//! let (mut status_rx, _task) = ConnectivityMonitor::new(probe).spawn();
//!
//! while status_rx.changed().await.is_ok() {
//!     let status = *status_rx.borrow();
//!     println!("reachable: {} ({})", status.reachable, status.quality.label());
//! }
//! # }
//! ```

mod error;
mod monitor;
mod provider;
pub mod types;

pub use error::{ConnectivityError, Result};
pub use monitor::{ConnectivityMonitor, POLL_INTERVAL};
pub use provider::{NetworkStatusProvider, TcpProbe};
pub use types::{ConnectionType, ConnectivityStatus, QualityHint, RawNetworkStatus};
