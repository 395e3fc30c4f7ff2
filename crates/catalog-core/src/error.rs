//! Error types for the catalog core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure reported by a cache backend.
///
/// Never leaves the cache facade; it is logged there and turned into
/// [`CacheOutcome::Unavailable`](crate::CacheOutcome::Unavailable).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Transport failure. Moves the facade out of `Connected`.
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// The server answered but rejected the command.
    #[error("Cache protocol error: {0}")]
    Protocol(String),
}

impl CacheError {
    pub fn is_transport(&self) -> bool {
        matches!(self, CacheError::Connection(_))
    }
}

/// Failure reported by a store connector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store connectivity error: {0}")]
    Connectivity(String),

    #[error("Store query error: {0}")]
    Query(String),
}

/// Hard failures surfaced by the repository
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Replica and primary both failed to answer a read.
    #[error("Primary store unavailable: {0}")]
    PrimaryUnavailable(StoreError),

    /// A write against the primary failed. Writes never fail over.
    #[error("Write to primary store failed: {0}")]
    Write(StoreError),
}

impl CatalogError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::PrimaryUnavailable(_) | CatalogError::Write(_) => "store_unavailable",
        }
    }
}
