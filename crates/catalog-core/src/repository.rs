//! Product repository
//!
//! Owns the consistency contract between the cache and the stores:
//!
//! - Reads go cache, then replica, then primary (single failover, no retry),
//!   and fill the cache on a database hit.
//! - Writes go to the primary only; updates invalidate the cache entry
//!   afterwards without waiting on the outcome.
//!
//! A read racing an update can fill the cache with the pre-update row right
//! after the invalidation, so a stale entry may outlive the write by up to
//! one more TTL. Entries carry no version to detect this.

use crate::cache::{CacheFacade, CacheOutcome};
use crate::error::{CatalogError, Result, StoreError};
use crate::ports::{ProductStatement, StoreConnector};
use catalog_types::{Product, ProductFields, Sourced, PRODUCT_ENTITY};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifetime of a cache fill
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Cache key for a product, e.g. `product:42`
pub fn cache_key(id: i64) -> String {
    format!("{}:{}", PRODUCT_ENTITY, id)
}

pub struct ProductRepository {
    cache: Arc<CacheFacade>,
    primary: Arc<dyn StoreConnector>,
    replica: Arc<dyn StoreConnector>,
    ttl: Duration,
}

impl ProductRepository {
    pub fn new(
        cache: Arc<CacheFacade>,
        primary: Arc<dyn StoreConnector>,
        replica: Arc<dyn StoreConnector>,
    ) -> Self {
        Self {
            cache,
            primary,
            replica,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Look a product up by id. `Ok(None)` means no row in the store that
    /// answered.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Sourced<Product>>> {
        let key = cache_key(id);

        if let Some(product) = self.cached(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(Some(Sourced::from_cache(product)));
        }

        debug!("Cache miss for {}, reading from database", key);

        let statement = ProductStatement::SelectById { id };
        let rows = self.read(&statement).await?;

        let Some(product) = rows.into_iter().next() else {
            return Ok(None);
        };

        self.fill(&key, &product).await;

        Ok(Some(Sourced::from_database(product)))
    }

    /// Insert a product on the primary. New rows are not cached; the first
    /// read fills the cache.
    pub async fn create(&self, fields: ProductFields) -> Result<Product> {
        let statement = ProductStatement::Insert { fields };

        let rows = self
            .primary
            .execute(&statement)
            .await
            .map_err(CatalogError::Write)?;

        let product = rows.into_iter().next().ok_or_else(|| {
            CatalogError::Write(StoreError::Query("insert returned no row".to_string()))
        })?;

        info!("Created product {}", product.id);
        Ok(product)
    }

    /// Update a product on the primary and invalidate its cache entry.
    ///
    /// Returns `Ok(None)` without touching the cache when no row matched.
    pub async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>> {
        let statement = ProductStatement::Update { id, fields };

        let rows = self
            .primary
            .execute(&statement)
            .await
            .map_err(CatalogError::Write)?;

        let Some(product) = rows.into_iter().next() else {
            return Ok(None);
        };

        let key = cache_key(id);
        match self.cache.delete(&key).await {
            CacheOutcome::Ok(()) => info!("Cache invalidated for {}", key),
            CacheOutcome::Unavailable => warn!("Cache not invalidated for {}", key),
        }

        Ok(Some(product))
    }

    /// Cached snapshot for `key`, if any. Unavailable and corrupt entries
    /// both count as a miss.
    async fn cached(&self, key: &str) -> Option<Product> {
        let bytes = self.cache.get(key).await.ok().flatten()?;

        match serde_json::from_slice(&bytes) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Replica first; on any replica failure, the same statement once on
    /// the primary. A primary failure is a hard error.
    async fn read(&self, statement: &ProductStatement) -> Result<Vec<Product>> {
        match self.replica.query(statement).await {
            Ok(rows) => Ok(rows),
            Err(replica_err) => {
                warn!(
                    "Query on {} failed, falling back to {}: {}",
                    self.replica.role(),
                    self.primary.role(),
                    replica_err
                );
                self.primary
                    .query(statement)
                    .await
                    .map_err(CatalogError::PrimaryUnavailable)
            }
        }
    }

    async fn fill(&self, key: &str, product: &Product) {
        let value = match serde_json::to_vec(product) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize {} for cache: {}", key, e);
                return;
            }
        };

        if self.cache.set(key, &value, self.ttl).await.is_unavailable() {
            debug!("Cache fill skipped for {}", key);
        }
    }
}
