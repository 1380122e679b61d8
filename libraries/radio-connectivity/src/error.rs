//! Error types for connectivity probing

use std::time::Duration;
use thiserror::Error;

/// Connectivity errors
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// The platform network-status query failed
    #[error("Network status query failed: {0}")]
    Query(String),

    /// The probe did not answer in time
    #[error("Network probe timed out after {0:?}")]
    Timeout(Duration),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for connectivity operations
pub type Result<T> = std::result::Result<T, ConnectivityError>;
