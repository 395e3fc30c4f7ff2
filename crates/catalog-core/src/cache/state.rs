//! Connection state machine for the cache facade

use serde::Serialize;
use std::time::Duration;

/// Reconnection limits and backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts allowed before the facade is disabled for good.
    pub max_attempts: u32,
    /// Backoff added per attempt.
    pub step: Duration,
    /// Upper bound on the backoff between two attempts.
    pub cap: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            step: Duration::from_millis(100),
            cap: Duration::from_secs(3),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt `attempt` (1-based): linear, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.cap)
    }
}

/// Where the facade stands with its backend.
///
/// `Disabled` is terminal for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Reconnecting { attempt: u32 },
    Disabled,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// A transport error was observed.
    pub fn on_transport_error(self) -> Self {
        match self {
            ConnectionState::Connected => ConnectionState::Reconnecting { attempt: 1 },
            other => other,
        }
    }

    /// A reconnect handshake succeeded.
    pub fn on_handshake_ok(self) -> Self {
        match self {
            ConnectionState::Reconnecting { .. } => ConnectionState::Connected,
            other => other,
        }
    }

    /// A reconnect handshake failed.
    pub fn on_attempt_failed(self, policy: &ReconnectPolicy) -> Self {
        match self {
            ConnectionState::Reconnecting { attempt } => {
                let next = attempt.saturating_add(1);
                if next > policy.max_attempts {
                    ConnectionState::Disabled
                } else {
                    ConnectionState::Reconnecting { attempt: next }
                }
            }
            other => other,
        }
    }
}
