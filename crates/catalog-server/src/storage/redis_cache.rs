//! Redis cache backend

use async_trait::async_trait;
use catalog_core::{CacheBackend, CacheError};
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};
use std::time::Duration;
use tokio::sync::RwLock;

/// Redis backend over a single multiplexed connection.
///
/// The connection is only (re)established by [`CacheBackend::ping`]; until
/// then every command fails with a connection error.
pub struct RedisCache {
    client: Client,
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisCache {
    /// Parse the URL. Does not connect.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(cache_error)?;
        Ok(Self {
            client,
            conn: RwLock::new(None),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| CacheError::Connection("not connected".to_string()))
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<Vec<u8>>>(&mut conn)
            .await
            .map_err(cache_error)
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(cache_error)?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(cache_error)?;

        *self.conn.write().await = Some(conn);
        Ok(())
    }
}

fn cache_error(e: RedisError) -> CacheError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        CacheError::Connection(e.to_string())
    } else {
        CacheError::Protocol(e.to_string())
    }
}
