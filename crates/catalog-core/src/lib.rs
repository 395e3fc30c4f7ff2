//! Catalog Core Library
//!
//! Read/write orchestration for products: cache-aside lookup, replica to
//! primary read failover, cache population and write-triggered invalidation.

// Re-export pure types from catalog-types
pub use catalog_types::*;

pub mod cache;
pub mod error;
pub mod ports;
pub mod repository;

pub use cache::{CacheFacade, CacheOutcome, ConnectionState, ReconnectPolicy};
pub use error::{CacheError, CatalogError, Result, StoreError, StoreResult};
pub use ports::{CacheBackend, Param, ProductStatement, StoreConnector, StoreRole};
pub use repository::{cache_key, ProductRepository, DEFAULT_CACHE_TTL};
