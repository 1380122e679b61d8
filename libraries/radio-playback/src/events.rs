//! Session events
//!
//! The manager queues events as it mutates the session; the runtime drains
//! them after every input to arm timers and refresh subscribers.

use crate::types::{ErrorKind, RetryTicket, SessionState};
use radio_connectivity::ConnectivityStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by the session manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// State or error kind changed
    StateChanged {
        state: SessionState,
        error: Option<ErrorKind>,
    },

    /// Volume changed (0.0-1.0)
    VolumeChanged { volume: f32 },

    /// A reconnect should fire after `delay`
    RetryScheduled {
        ticket: RetryTicket,
        delay: Duration,
        /// Attempt number, starting at 1
        attempt: u32,
    },

    /// A previously scheduled reconnect must not fire
    RetryCancelled { ticket: RetryTicket },

    /// The session observed a new connectivity status
    ConnectivityChanged { status: ConnectivityStatus },
}

impl SessionEvent {
    /// Whether this event carries a timer instruction for the runtime
    pub fn is_timer_event(&self) -> bool {
        matches!(
            self,
            SessionEvent::RetryScheduled { .. } | SessionEvent::RetryCancelled { .. }
        )
    }
}
