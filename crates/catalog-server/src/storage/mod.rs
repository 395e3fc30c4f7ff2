//! Storage layer
//!
//! Postgres connectors for the primary and replica, and the two cache
//! backends: Redis, or an in-process DashMap when no Redis is configured.

pub mod memory;
pub mod postgres;
pub mod redis_cache;

pub use memory::MemoryCache;
pub use postgres::PgConnector;
pub use redis_cache::RedisCache;
