//! Platform network-status providers
//!
//! Mobile builds bridge the native network-status API through
//! `NetworkStatusProvider`; desktop builds use `TcpProbe`.

use crate::error::Result;
use crate::types::{ConnectionType, RawNetworkStatus};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

/// One-shot query of the device network status
#[async_trait]
pub trait NetworkStatusProvider: Send + Sync {
    /// Query the current network status
    ///
    /// # Returns
    /// * `Ok(status)` - Platform answered
    /// * `Err(_)` - Query failed; the monitor degrades to an unknown status
    async fn network_status(&self) -> Result<RawNetworkStatus>;
}

/// Reachability probe that opens a TCP connection to the stream host
///
/// Desktop platforms expose no portable connection-type API, so a successful
/// connect is reported as `ConnectionType::Other` (unknown quality).
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe for `host:port`
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    /// Probed address
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl NetworkStatusProvider for TcpProbe {
    async fn network_status(&self) -> Result<RawNetworkStatus> {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(_stream)) => Ok(RawNetworkStatus::connected(ConnectionType::Other)),
            Ok(Err(e)) => {
                tracing::debug!(address = %self.address, error = %e, "Probe connect failed");
                Ok(RawNetworkStatus::disconnected())
            }
            Err(_) => {
                tracing::debug!(address = %self.address, timeout = ?self.timeout, "Probe timed out");
                Ok(RawNetworkStatus::disconnected())
            }
        }
    }
}
