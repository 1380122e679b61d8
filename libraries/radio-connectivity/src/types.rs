//! Connectivity types and quality classification

use serde::{Deserialize, Serialize};

/// Raw connection type as reported by the platform network-status API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Platform could not determine the type
    Unknown,

    /// No active connection
    None,

    Wifi,
    Cellular,
    Bluetooth,
    Ethernet,
    Wimax,
    Vpn,

    /// Connected through something the platform does not name
    Other,
}

/// Coarse link quality shown by the network indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityHint {
    Unknown,
    None,
    Fair,
    Good,
    Excellent,
}

impl From<ConnectionType> for QualityHint {
    fn from(connection: ConnectionType) -> Self {
        match connection {
            ConnectionType::Wifi | ConnectionType::Ethernet => QualityHint::Excellent,
            ConnectionType::Cellular | ConnectionType::Wimax => QualityHint::Good,
            ConnectionType::Bluetooth | ConnectionType::Vpn => QualityHint::Fair,
            ConnectionType::None => QualityHint::None,
            ConnectionType::Unknown | ConnectionType::Other => QualityHint::Unknown,
        }
    }
}

impl QualityHint {
    /// Label for the network indicator
    pub fn label(self) -> &'static str {
        match self {
            QualityHint::Excellent => "Excellent",
            QualityHint::Good => "Good",
            QualityHint::Fair => "Fair",
            QualityHint::None => "No connection",
            QualityHint::Unknown => "Unknown",
        }
    }
}

/// One-shot answer from the platform network-status API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNetworkStatus {
    /// Whether the platform reports an active connection
    pub connected: bool,

    /// Connection type
    pub connection_type: ConnectionType,
}

impl RawNetworkStatus {
    /// Status of a device with no connection at all
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            connection_type: ConnectionType::None,
        }
    }

    /// Status of a connected device
    pub fn connected(connection_type: ConnectionType) -> Self {
        Self {
            connected: true,
            connection_type,
        }
    }
}

/// Classified reachability consumed by the playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityStatus {
    /// Whether the stream endpoint can plausibly be reached
    pub reachable: bool,

    /// Coarse quality hint
    pub quality: QualityHint,
}

impl ConnectivityStatus {
    /// Classify a raw platform status
    ///
    /// A connected device whose type maps to `none` is treated as unreachable.
    pub fn from_raw(raw: RawNetworkStatus) -> Self {
        if !raw.connected {
            return Self::offline();
        }

        let quality = QualityHint::from(raw.connection_type);
        Self {
            reachable: quality != QualityHint::None,
            quality,
        }
    }

    /// Status used before the first poll and when a poll fails
    ///
    /// Unknown quality does not block playback.
    pub fn unknown() -> Self {
        Self {
            reachable: true,
            quality: QualityHint::Unknown,
        }
    }

    /// Status of a device with no connectivity
    pub fn offline() -> Self {
        Self {
            reachable: false,
            quality: QualityHint::None,
        }
    }
}

impl Default for ConnectivityStatus {
    fn default() -> Self {
        Self::unknown()
    }
}
