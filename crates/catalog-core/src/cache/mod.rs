//! Fail-open cache facade
//!
//! The cache is an optimization, never a dependency. Every operation returns
//! a [`CacheOutcome`]; transport failures are logged and reported as
//! `Unavailable`, and a background task walks the [`ConnectionState`] machine
//! until the backend answers again or the facade gives up for good.

pub mod facade;
pub mod state;

pub use facade::{CacheFacade, CacheOutcome};
pub use state::{ConnectionState, ReconnectPolicy};
