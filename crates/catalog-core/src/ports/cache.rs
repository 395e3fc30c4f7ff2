//! Raw key-value cache transport

use crate::error::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// A key-value store reachable over some transport.
///
/// Implementations report every failure; swallowing them is the job of
/// [`CacheFacade`](crate::CacheFacade).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;
    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// Establish (or re-establish) the connection and verify it answers.
    async fn ping(&self) -> Result<(), CacheError>;
}
