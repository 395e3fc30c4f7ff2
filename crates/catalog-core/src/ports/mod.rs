//! Port traits (interfaces) for dependency injection

pub mod cache;
pub mod store;

pub use cache::CacheBackend;
pub use store::{Param, ProductStatement, StoreConnector, StoreRole};
