//! XCache - a bounded disk-backed key-value cache
//!
//! Stores one file per key under a configured directory, tags payloads with
//! an optional self-describing expiration header, and evicts
//! least-recently-used entries to keep the directory within byte and count
//! limits.
//!
//! ```no_run
//! use xcache::{CacheConfig, CacheStore};
//!
//! let store = CacheStore::open(
//!     CacheConfig::new("/tmp/app-cache")
//!         .size_limit_bytes(5_000_000)
//!         .count_limit(1_000),
//! )?;
//!
//! store.put("greeting", b"hello", Some(60));
//! assert_eq!(store.get("greeting"), Some(b"hello".to_vec()));
//! # Ok::<(), xcache::CacheError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, CacheStore};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
