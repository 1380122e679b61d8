//! Connectivity monitor - fixed-interval polling
//!
//! Polls a `NetworkStatusProvider` every five seconds and publishes the
//! classified status when it changes. Only the current value is kept.

use crate::provider::NetworkStatusProvider;
use crate::types::ConnectivityStatus;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Poll interval (not configurable at runtime)
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Periodic poller of device network reachability
pub struct ConnectivityMonitor<P> {
    provider: P,
    current: Option<ConnectivityStatus>,
}

impl<P: NetworkStatusProvider + 'static> ConnectivityMonitor<P> {
    /// Create a monitor around a platform provider
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            current: None,
        }
    }

    /// Last classified status (None before the first poll)
    pub fn current(&self) -> Option<ConnectivityStatus> {
        self.current
    }

    /// Query the provider once
    ///
    /// Returns the new status only when it differs from the previous one.
    /// A failed query degrades to `ConnectivityStatus::unknown()`.
    pub async fn poll_once(&mut self) -> Option<ConnectivityStatus> {
        let status = match self.provider.network_status().await {
            Ok(raw) => ConnectivityStatus::from_raw(raw),
            Err(e) => {
                tracing::warn!(error = %e, "Network status check failed");
                ConnectivityStatus::unknown()
            }
        };

        if self.current == Some(status) {
            return None;
        }

        tracing::info!(
            reachable = status.reachable,
            quality = status.quality.label(),
            "Connectivity changed"
        );
        self.current = Some(status);
        Some(status)
    }

    /// Run the poll loop on the current tokio runtime
    ///
    /// The first poll happens immediately. The receiver starts at
    /// `ConnectivityStatus::unknown()`; the loop exits once every receiver
    /// has been dropped.
    pub fn spawn(self) -> (watch::Receiver<ConnectivityStatus>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(ConnectivityStatus::unknown());
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    async fn run(mut self, tx: watch::Sender<ConnectivityStatus>) {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = tx.closed() => break,
            }

            if let Some(status) = self.poll_once().await {
                tx.send_replace(status);
            }
        }

        tracing::debug!("Connectivity monitor stopped");
    }
}
