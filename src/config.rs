//! Configuration Module
//!
//! Construction-time settings for a cache store, assembled with a chaining
//! builder. Every store owns its own configuration; independently
//! configured stores can coexist in one process.

use std::path::PathBuf;

/// Default size limit: 10 MB.
pub const DEFAULT_SIZE_LIMIT_BYTES: u64 = 10_000_000;

/// Cache store configuration.
///
/// Only the cache directory is required; limits and the default TTL come
/// with permissive defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding one file per cached key
    pub cache_dir: PathBuf,
    /// Maximum total byte size before LRU eviction kicks in
    pub size_limit_bytes: u64,
    /// Maximum entry count; `None` means unbounded
    pub count_limit: Option<u64>,
    /// TTL applied to puts without an explicit TTL; `None` means never expire
    pub default_ttl_secs: Option<u64>,
}

impl CacheConfig {
    /// Creates a configuration for `cache_dir` with default limits:
    /// 10 MB size limit, unbounded count, no default TTL.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            size_limit_bytes: DEFAULT_SIZE_LIMIT_BYTES,
            count_limit: None,
            default_ttl_secs: None,
        }
    }

    /// Sets the maximum total byte size.
    pub fn size_limit_bytes(mut self, limit: u64) -> Self {
        self.size_limit_bytes = limit;
        self
    }

    /// Sets the maximum entry count.
    pub fn count_limit(mut self, limit: u64) -> Self {
        self.count_limit = Some(limit);
        self
    }

    /// Sets the TTL in seconds applied to puts that carry none.
    pub fn default_ttl_secs(mut self, ttl: u64) -> Self {
        self.default_ttl_secs = Some(ttl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CacheConfig::new("/tmp/cache");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.size_limit_bytes, DEFAULT_SIZE_LIMIT_BYTES);
        assert_eq!(config.count_limit, None);
        assert_eq!(config.default_ttl_secs, None);
    }

    #[test]
    fn test_config_builder_chaining() {
        let config = CacheConfig::new("/tmp/cache")
            .size_limit_bytes(1024)
            .count_limit(100)
            .default_ttl_secs(300);

        assert_eq!(config.size_limit_bytes, 1024);
        assert_eq!(config.count_limit, Some(100));
        assert_eq!(config.default_ttl_secs, Some(300));
    }
}
