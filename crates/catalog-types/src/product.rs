//! Product types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity type prefix used for cache keys
pub const PRODUCT_ENTITY: &str = "product";

/// A product row as committed to the primary store.
///
/// The store assigns `id` and maintains `updated_at`; any cached copy is a
/// snapshot of this row, never the authoritative instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub updated_at: DateTime<Utc>,
}

/// Writable product fields (create and update requests)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub price_cents: i64,
}

impl ProductFields {
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        Self {
            name: name.into(),
            price_cents,
        }
    }
}
