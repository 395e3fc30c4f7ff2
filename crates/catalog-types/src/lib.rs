//! Catalog Types - Pure type definitions
//!
//! This crate contains only plain data types with no async runtime
//! dependencies, shared by the core and the HTTP server.

pub mod product;

pub use product::*;

use serde::{Deserialize, Serialize};

/// Where a read was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadSource {
    Cache,
    Database,
}

impl std::fmt::Display for ReadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadSource::Cache => write!(f, "cache"),
            ReadSource::Database => write!(f, "database"),
        }
    }
}

/// A value tagged with the layer that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub source: ReadSource,
    pub data: T,
}

impl<T> Sourced<T> {
    pub fn from_cache(data: T) -> Self {
        Self {
            source: ReadSource::Cache,
            data,
        }
    }

    pub fn from_database(data: T) -> Self {
        Self {
            source: ReadSource::Database,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        let sourced = Sourced::from_cache(7);
        let json = serde_json::to_value(&sourced).unwrap();
        assert_eq!(json, serde_json::json!({ "source": "cache", "data": 7 }));

        assert_eq!(ReadSource::Database.to_string(), "database");
    }
}
