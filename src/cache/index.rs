//! Entry Index Module
//!
//! In-memory bookkeeping for the on-disk entries: a path to last-access-time
//! map used for least-recently-used selection, plus atomic running totals of
//! cache size and entry count.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

// == Entry Index ==
/// Maps each entry's storage path to its last-access timestamp (Unix ms).
///
/// The store serializes every mutation behind one mutex; this type itself
/// carries no locking.
#[derive(Debug, Default)]
pub struct EntryIndex {
    last_access: HashMap<PathBuf, u64>,
}

impl EntryIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Records `path` as accessed at `timestamp_ms`, inserting it if new.
    pub fn touch(&mut self, path: &Path, timestamp_ms: u64) {
        self.last_access.insert(path.to_path_buf(), timestamp_ms);
    }

    // == Forget ==
    /// Drops `path` from the index, returning its last-access stamp if it
    /// was tracked.
    pub fn forget(&mut self, path: &Path) -> Option<u64> {
        self.last_access.remove(path)
    }

    // == Contains ==
    /// Checks whether `path` is tracked.
    pub fn contains(&self, path: &Path) -> bool {
        self.last_access.contains_key(path)
    }

    // == Least Recently Used ==
    /// Returns the path with the minimum last-access timestamp, or `None`
    /// on an empty index.
    ///
    /// Linear scan; entries sharing the minimum stamp tie-break on whatever
    /// the map iteration visits first.
    pub fn least_recently_used(&self) -> Option<PathBuf> {
        self.last_access
            .iter()
            .min_by_key(|(_, ts)| **ts)
            .map(|(path, _)| path.clone())
    }

    // == Clear ==
    /// Removes every tracked entry.
    pub fn clear(&mut self) {
        self.last_access.clear();
    }

    // == Length ==
    /// Returns the number of tracked entries.
    pub fn len(&self) -> usize {
        self.last_access.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.last_access.is_empty()
    }
}

// == Counters ==
/// Lock-free running totals of cache size (bytes) and entry count.
///
/// Increments and decrements are atomic on their own; the store still runs
/// the whole read-scan-mutate eviction sequence under the index lock so the
/// totals and the index cannot drift apart across an eviction.
#[derive(Debug, Default)]
pub struct Counters {
    total_size: AtomicU64,
    total_count: AtomicU64,
}

impl Counters {
    // == Constructor ==
    /// Creates counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Size ==
    /// Current total byte size.
    pub fn size(&self) -> u64 {
        self.total_size.load(Ordering::Relaxed)
    }

    /// Adds `delta` bytes to the total size.
    pub fn add_size(&self, delta: u64) {
        self.total_size.fetch_add(delta, Ordering::Relaxed);
    }

    /// Subtracts `delta` bytes from the total size, saturating at zero so a
    /// stale measurement can never wrap the total.
    pub fn sub_size(&self, delta: u64) {
        let _ = self
            .total_size
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(delta))
            });
    }

    // == Count ==
    /// Current entry count.
    pub fn count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Adds `delta` entries to the count.
    pub fn add_count(&self, delta: u64) {
        self.total_count.fetch_add(delta, Ordering::Relaxed);
    }

    /// Subtracts `delta` entries from the count, saturating at zero.
    pub fn sub_count(&self, delta: u64) {
        let _ = self
            .total_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(delta))
            });
    }

    // == Set ==
    /// Overwrites both totals, used when the startup scan publishes what it
    /// measured.
    pub fn set(&self, size: u64, count: u64) {
        self.total_size.store(size, Ordering::Relaxed);
        self.total_count.store(count, Ordering::Relaxed);
    }

    // == Reset ==
    /// Zeroes both totals.
    pub fn reset(&self) {
        self.set(0, 0);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn p(name: &str) -> PathBuf {
        PathBuf::from(format!("/cache/{name}"))
    }

    #[test]
    fn test_index_new() {
        let index = EntryIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.least_recently_used(), None);
    }

    #[test]
    fn test_index_touch_and_contains() {
        let mut index = EntryIndex::new();
        index.touch(&p("a"), 100);
        assert!(index.contains(&p("a")));
        assert!(!index.contains(&p("b")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_index_touch_refreshes_stamp() {
        let mut index = EntryIndex::new();
        index.touch(&p("a"), 100);
        index.touch(&p("b"), 200);
        assert_eq!(index.least_recently_used(), Some(p("a")));

        // Refreshing "a" makes "b" the oldest.
        index.touch(&p("a"), 300);
        assert_eq!(index.least_recently_used(), Some(p("b")));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_index_forget() {
        let mut index = EntryIndex::new();
        index.touch(&p("a"), 100);
        assert_eq!(index.forget(&p("a")), Some(100));
        assert_eq!(index.forget(&p("a")), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_least_recently_used_order() {
        let mut index = EntryIndex::new();
        index.touch(&p("newest"), 300);
        index.touch(&p("oldest"), 100);
        index.touch(&p("middle"), 200);
        assert_eq!(index.least_recently_used(), Some(p("oldest")));

        index.forget(&p("oldest"));
        assert_eq!(index.least_recently_used(), Some(p("middle")));
    }

    #[test]
    fn test_index_tied_stamps_pick_one() {
        let mut index = EntryIndex::new();
        index.touch(&p("a"), 100);
        index.touch(&p("b"), 100);
        let victim = index.least_recently_used().unwrap();
        assert!(victim == p("a") || victim == p("b"));
    }

    #[test]
    fn test_index_clear() {
        let mut index = EntryIndex::new();
        index.touch(&p("a"), 100);
        index.touch(&p("b"), 200);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.least_recently_used(), None);
    }

    #[test]
    fn test_counters_add_sub() {
        let counters = Counters::new();
        counters.add_size(100);
        counters.add_count(1);
        assert_eq!(counters.size(), 100);
        assert_eq!(counters.count(), 1);

        counters.sub_size(40);
        assert_eq!(counters.size(), 60);
    }

    #[test]
    fn test_counters_saturate_at_zero() {
        let counters = Counters::new();
        counters.add_size(10);
        counters.sub_size(100);
        assert_eq!(counters.size(), 0);
        counters.sub_count(5);
        assert_eq!(counters.count(), 0);
    }

    #[test]
    fn test_counters_set_and_reset() {
        let counters = Counters::new();
        counters.set(1234, 5);
        assert_eq!(counters.size(), 1234);
        assert_eq!(counters.count(), 5);
        counters.reset();
        assert_eq!(counters.size(), 0);
        assert_eq!(counters.count(), 0);
    }
}
