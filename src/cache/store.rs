//! Cache Store Module
//!
//! Disk-backed cache engine: one file per key under the configured
//! directory, LRU eviction against byte and count limits, lazy TTL expiry
//! on read.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::expiry::{self, current_timestamp_ms};
use crate::cache::index::{Counters, EntryIndex};
use crate::cache::stats::{CacheStats, StatRecorder};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Shared State ==
/// State shared between store callers and the startup scan thread.
#[derive(Debug, Default)]
struct Shared {
    index: Mutex<EntryIndex>,
    counters: Counters,
    stats: StatRecorder,
}

// == Cache Store ==
/// Disk-backed cache with LRU eviction and TTL support.
///
/// A store exclusively owns its cache directory; running two stores over
/// the same directory is unsupported. All operations take `&self` and may
/// run concurrently from independent threads; file I/O blocks the caller.
///
/// Keys map directly to file names inside the cache directory, with no
/// hashing or escaping, so a key must be a single filesystem-safe path
/// segment. Empty keys, `.`, `..`, and keys containing a path separator
/// are rejected: puts become logged no-ops and gets become misses.
///
/// Absent, expired, and unreadable entries all surface as the same miss;
/// callers cannot tell the three apart.
#[derive(Debug)]
pub struct CacheStore {
    cache_dir: PathBuf,
    size_limit_bytes: u64,
    count_limit: Option<u64>,
    default_ttl_secs: Option<u64>,
    shared: Arc<Shared>,
    scan_handle: Mutex<Option<JoinHandle<()>>>,
}

impl CacheStore {
    // == Open ==
    /// Opens a store over the configured directory, creating it if needed.
    ///
    /// Directory creation failure is fatal and returned. A background scan
    /// of whatever files already exist starts immediately; see
    /// [`CacheStore::wait_for_initial_scan`].
    pub fn open(config: CacheConfig) -> Result<Self> {
        fs::create_dir_all(&config.cache_dir).map_err(|source| CacheError::CreateDir {
            path: config.cache_dir.clone(),
            source,
        })?;

        let shared = Arc::new(Shared::default());
        let scan_handle = spawn_startup_scan(config.cache_dir.clone(), Arc::clone(&shared));

        info!(dir = %config.cache_dir.display(), "opened cache store");
        Ok(Self {
            cache_dir: config.cache_dir,
            size_limit_bytes: config.size_limit_bytes,
            count_limit: config.count_limit,
            default_ttl_secs: config.default_ttl_secs,
            shared,
            scan_handle: Mutex::new(Some(scan_handle)),
        })
    }

    // == Wait For Initial Scan ==
    /// Blocks until the startup directory scan has finished.
    ///
    /// The scan runs detached by default, so puts and gets issued right
    /// after [`CacheStore::open`] may operate on an incomplete index:
    /// counters can undercount and eviction can under-trigger until it
    /// completes. Callers that need a consistent view immediately join it
    /// here. Safe to call from any number of threads: the handle lock is
    /// held across the join, so every caller returning from this method
    /// observes the published totals.
    pub fn wait_for_initial_scan(&self) {
        let mut guard = self.scan_handle.lock();
        if let Some(handle) = guard.take() {
            if handle.join().is_err() {
                warn!("startup scan thread panicked");
            }
        }
    }

    // == Put ==
    /// Stores `value` under `key`, tagged with `ttl_seconds` (falling back
    /// to the configured default TTL; `None` or zero means the entry never
    /// expires).
    ///
    /// The write happens first; accounting and eviction then run against
    /// the size actually on disk, so a partial write is tolerated rather
    /// than rolled back. I/O failures are logged and swallowed.
    ///
    /// Overwriting an existing key refreshes its LRU stamp only: the
    /// eviction pass is skipped and the size delta is not folded into the
    /// running total, trading accounting drift for not re-measuring every
    /// overwrite.
    pub fn put(&self, key: &str, value: &[u8], ttl_seconds: Option<u64>) {
        if !valid_key(key) {
            warn!(key, "rejected put for invalid cache key");
            return;
        }
        let path = self.path_for(key);
        let encoded = expiry::encode(ttl_seconds.or(self.default_ttl_secs), value);
        if let Err(err) = fs::write(&path, &encoded) {
            warn!(key, %err, "cache write failed");
        }
        self.account_put(&path);
        debug!(key, bytes = encoded.len(), "stored cache entry");
    }

    // == Get ==
    /// Retrieves the payload for `key`, or `None` for absent, expired, or
    /// unreadable entries.
    ///
    /// An expired entry is deleted and de-accounted on the spot. A hit
    /// strips the expiration header and refreshes the entry's LRU stamp on
    /// disk and in the index.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        if !valid_key(key) {
            self.shared.stats.record_miss();
            return None;
        }
        let path = self.path_for(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!(key, %err, "cache read failed");
                }
                self.shared.stats.record_miss();
                return None;
            }
        };

        if expiry::is_expired(&data, current_timestamp_ms()) {
            debug!(key, "entry expired, removing");
            self.remove(key);
            self.shared.stats.record_miss();
            return None;
        }

        let payload = expiry::strip(&data).to_vec();
        let now = current_timestamp_ms();
        {
            let mut index = self.shared.index.lock();
            // Only entries the index knows get their stamp refreshed, same
            // as on the write path.
            if index.contains(&path) {
                touch_file(&path, now);
                index.touch(&path, now);
            }
        }
        self.shared.stats.record_hit();
        Some(payload)
    }

    // == Remove ==
    /// Deletes `key`'s file and accounting. Unknown keys are complete
    /// no-ops; calling twice in a row is safe.
    pub fn remove(&self, key: &str) {
        if !valid_key(key) {
            return;
        }
        let path = self.path_for(key);
        let mut index = self.shared.index.lock();
        // Counter deltas are taken from the index state, so a key that was
        // never admitted cannot drag the totals below their true values.
        if index.forget(&path).is_some() {
            let freed = file_size(&path);
            self.shared.counters.sub_size(freed);
            self.shared.counters.sub_count(1);
        }
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(key, %err, "failed to delete cache entry");
            }
        }
    }

    // == Clear ==
    /// Deletes every file in the cache directory and zeroes the index and
    /// counters.
    ///
    /// The sweep is directory-driven rather than index-driven, so files the
    /// index never saw are deleted too.
    pub fn clear(&self) {
        let mut index = self.shared.index.lock();
        index.clear();
        self.shared.counters.reset();
        match fs::read_dir(&self.cache_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if let Err(err) = fs::remove_file(&path) {
                        warn!(path = %path.display(), %err, "failed to delete entry during clear");
                    }
                }
            }
            Err(err) => warn!(%err, "failed to read cache directory during clear"),
        }
        info!("cache cleared");
    }

    // == Path For ==
    /// Returns the on-disk path for `key` without touching the filesystem.
    ///
    /// The mapping is the raw key joined onto the cache directory. No
    /// hashing, so distinct keys can never collide.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.cache_dir.join(key)
    }

    // == Totals ==
    /// Bytes currently accounted to the cache.
    pub fn total_size_bytes(&self) -> u64 {
        self.shared.counters.size()
    }

    /// Entries currently accounted to the cache.
    pub fn entry_count(&self) -> u64 {
        self.shared.counters.count()
    }

    // == Stats ==
    /// Snapshot of hit/miss/eviction tallies and the running totals.
    pub fn stats(&self) -> CacheStats {
        self.shared
            .stats
            .snapshot(self.entry_count(), self.total_size_bytes())
    }

    // == Eviction Accounting ==
    /// Accounting step shared by every put: admits the file into the index
    /// and counters, evicting least-recently-used entries while the count
    /// or size limit is exceeded.
    ///
    /// Runs entirely under the index lock, making the read-counters /
    /// scan-index / mutate-both sequence a single critical section. When
    /// the index runs out of eviction candidates the new entry is admitted
    /// over the nominal limit: the limits are soft.
    fn account_put(&self, path: &Path) {
        let mut index = self.shared.index.lock();

        if !index.contains(path) {
            if let Some(count_limit) = self.count_limit {
                while self.shared.counters.count() + 1 > count_limit {
                    if !self.evict_one(&mut index) {
                        break;
                    }
                }
            }
            self.shared.counters.add_count(1);

            let size = file_size(path);
            while self.shared.counters.size() + size > self.size_limit_bytes {
                if !self.evict_one(&mut index) {
                    break;
                }
            }
            self.shared.counters.add_size(size);
        }

        let now = current_timestamp_ms();
        touch_file(path, now);
        index.touch(path, now);
    }

    /// Deletes the least-recently-used entry and de-accounts it. Returns
    /// false when the index has nothing left to evict.
    fn evict_one(&self, index: &mut EntryIndex) -> bool {
        let Some(victim) = index.least_recently_used() else {
            return false;
        };
        let freed = file_size(&victim);
        if let Err(err) = fs::remove_file(&victim) {
            if err.kind() != ErrorKind::NotFound {
                warn!(path = %victim.display(), %err, "failed to delete evicted entry");
            }
        }
        index.forget(&victim);
        self.shared.counters.sub_size(freed);
        self.shared.counters.sub_count(1);
        self.shared.stats.record_eviction();
        debug!(path = %victim.display(), freed, "evicted least-recently-used entry");
        true
    }
}

// == Startup Scan ==
/// Walks the cache directory once, seeding the index from file mtimes and
/// publishing measured totals to the counters.
///
/// Runs detached; operations racing the scan see an incomplete index until
/// it publishes, the accepted eventual-consistency window.
fn spawn_startup_scan(dir: PathBuf, shared: Arc<Shared>) -> JoinHandle<()> {
    thread::spawn(move || {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "startup scan failed to read cache directory");
                return;
            }
        };

        let mut total_size = 0u64;
        let mut total_count = 0u64;
        for entry in entries.flatten() {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let mtime_ms = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or_else(current_timestamp_ms);
            shared.index.lock().touch(&entry.path(), mtime_ms);
            total_size += metadata.len();
            total_count += 1;
        }
        shared.counters.set(total_size, total_count);
        debug!(entries = total_count, bytes = total_size, "startup scan complete");
    })
}

// == Helpers ==
/// A key must name a single path segment inside the cache directory.
fn valid_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\'])
}

/// Size of `path` on disk; missing files measure zero.
fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Best-effort refresh of the on-disk mtime, which doubles as the LRU
/// stamp the next startup scan will read back.
fn touch_file(path: &Path, timestamp_ms: u64) {
    let mtime = UNIX_EPOCH + Duration::from_millis(timestamp_ms);
    if let Ok(file) = fs::OpenOptions::new().write(true).open(path) {
        if let Err(err) = file.set_modified(mtime) {
            debug!(path = %path.display(), %err, "failed to refresh mtime");
        }
    }
}
