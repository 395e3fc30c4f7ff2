//! Cache facade with fail-open semantics

use super::state::{ConnectionState, ReconnectPolicy};
use crate::error::CacheError;
use crate::ports::CacheBackend;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Result of a cache operation. There is no error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum CacheOutcome<T> {
    Ok(T),
    /// The cache could not serve the call: transport error, reconnecting,
    /// or disabled. Callers treat this as a miss / no-op.
    Unavailable,
}

impl<T> CacheOutcome<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheOutcome::Unavailable)
    }

    pub fn ok(self) -> Option<T> {
        match self {
            CacheOutcome::Ok(value) => Some(value),
            CacheOutcome::Unavailable => None,
        }
    }
}

/// Process-wide cache handle shared by all requests.
pub struct CacheFacade {
    backend: Arc<dyn CacheBackend>,
    policy: ReconnectPolicy,
    state: Arc<RwLock<ConnectionState>>,
}

impl CacheFacade {
    /// Wrap a backend assumed to be connected.
    pub fn new(backend: Arc<dyn CacheBackend>, policy: ReconnectPolicy) -> Self {
        Self {
            backend,
            policy,
            state: Arc::new(RwLock::new(ConnectionState::Connected)),
        }
    }

    /// Wrap a backend and perform the initial handshake.
    ///
    /// A failed handshake never fails startup: the facade begins in
    /// `Reconnecting` and the API runs without cache meanwhile.
    pub async fn connect(backend: Arc<dyn CacheBackend>, policy: ReconnectPolicy) -> Self {
        let facade = Self::new(backend, policy);

        match facade.backend.ping().await {
            Ok(()) => info!("Cache connected"),
            Err(e) => {
                warn!("Cache not available at startup, serving without cache: {}", e);
                facade.lose_connection().await;
            }
        }

        facade
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn get(&self, key: &str) -> CacheOutcome<Option<Vec<u8>>> {
        if !self.is_connected().await {
            return CacheOutcome::Unavailable;
        }

        match self.backend.get(key).await {
            Ok(value) => CacheOutcome::Ok(value),
            Err(e) => {
                warn!("Cache GET failed for {}, continuing without cache: {}", key, e);
                self.on_error(e).await;
                CacheOutcome::Unavailable
            }
        }
    }

    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheOutcome<()> {
        if !self.is_connected().await {
            return CacheOutcome::Unavailable;
        }

        match self.backend.set_ex(key, value, ttl).await {
            Ok(()) => CacheOutcome::Ok(()),
            Err(e) => {
                warn!("Cache SET failed for {}, value not cached: {}", key, e);
                self.on_error(e).await;
                CacheOutcome::Unavailable
            }
        }
    }

    pub async fn delete(&self, key: &str) -> CacheOutcome<()> {
        if !self.is_connected().await {
            return CacheOutcome::Unavailable;
        }

        match self.backend.del(key).await {
            Ok(()) => CacheOutcome::Ok(()),
            Err(e) => {
                warn!("Cache DEL failed for {}, entry not invalidated: {}", key, e);
                self.on_error(e).await;
                CacheOutcome::Unavailable
            }
        }
    }

    async fn is_connected(&self) -> bool {
        self.state.read().await.is_connected()
    }

    async fn on_error(&self, error: CacheError) {
        if error.is_transport() {
            self.lose_connection().await;
        }
    }

    /// Only the caller that moves the state out of `Connected` spawns the
    /// reconnect task, so at most one runs at a time.
    async fn lose_connection(&self) {
        let mut state = self.state.write().await;
        if !state.is_connected() {
            return;
        }
        *state = state.on_transport_error();
        drop(state);

        debug!("Cache connection lost, starting reconnect task");
        tokio::spawn(reconnect(
            self.backend.clone(),
            self.state.clone(),
            self.policy,
        ));
    }
}

async fn reconnect(
    backend: Arc<dyn CacheBackend>,
    state: Arc<RwLock<ConnectionState>>,
    policy: ReconnectPolicy,
) {
    loop {
        let attempt = match *state.read().await {
            ConnectionState::Reconnecting { attempt } => attempt,
            _ => return,
        };

        tokio::time::sleep(policy.backoff(attempt)).await;

        let result = backend.ping().await;
        let mut current = state.write().await;
        match result {
            Ok(()) => {
                *current = current.on_handshake_ok();
                info!("Cache reconnected after {} attempt(s)", attempt);
                return;
            }
            Err(e) => {
                *current = current.on_attempt_failed(&policy);
                if *current == ConnectionState::Disabled {
                    warn!(
                        "Cache unavailable after {} attempts, continuing without cache: {}",
                        policy.max_attempts, e
                    );
                    return;
                }
                debug!("Cache reconnect attempt {} failed: {}", attempt, e);
            }
        }
    }
}
