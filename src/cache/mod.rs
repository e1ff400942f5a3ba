//! Cache Module
//!
//! Provides disk-backed caching with TTL expiration and LRU eviction.

pub mod expiry;
mod index;
mod stats;
mod store;


// Re-export public types
pub use index::{Counters, EntryIndex};
pub use stats::CacheStats;
pub use store::CacheStore;
