//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! Only construction can fail visibly: runtime I/O problems are logged and
//! degrade to a miss or a no-op, so missing and expired keys never surface
//! as errors.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache directory could not be created at construction
    #[error("cannot create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
