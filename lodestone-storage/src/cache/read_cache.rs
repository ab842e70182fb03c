//! Read-through cache over a [`Source`].
//!
//! Reads are served from memory once a key has been looked up, including
//! lookups that found nothing. Writes go through to the wrapped source
//! immediately. Mutations made directly against the wrapped source are never
//! observed by entries that are already cached.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lodestone_core::{CacheSettings, LodestoneResult};
use lru::LruCache;
use tracing::{debug, trace};

use super::bytes_key::BytesKey;
use super::entry::CacheEntry;
use super::stats::CacheStats;
use crate::lock::mutex_lock;
use crate::source::Source;

const SOURCE: &str = "cache::read_cache";

/// Read-through, write-through cache decorator.
///
/// # Eviction
///
/// When bounded, entries are evicted in insertion order. A hit does not
/// refresh an entry's position; only a fresh lookup of a key that is not
/// cached (a miss) inserts it at the newest end. Fetching keys `0..=9999`
/// with capacity 100 therefore keeps `9900..=9999`, and fetching `0` again
/// afterwards evicts `9900`.
///
/// # Concurrency
///
/// One mutex guards the entries and statistics for the whole
/// check, fetch, insert and evict sequence, so the capacity bound holds under
/// concurrent use. Calls block while the wrapped source performs I/O.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
/// use std::sync::Arc;
/// use lodestone_storage::{BytesKey, HashMapSource, ReadCache, Source};
///
/// let src = Arc::new(HashMapSource::<BytesKey, Vec<u8>>::new());
/// src.put(BytesKey::from(vec![1]), vec![0xaa]).unwrap();
///
/// let cache = ReadCache::new(Arc::clone(&src))
///     .with_max_capacity(NonZeroUsize::new(100).unwrap());
/// assert!(cache.get_cached(&BytesKey::from(vec![1])).is_none());
/// assert_eq!(cache.get(&BytesKey::from(vec![1])).unwrap(), Some(vec![0xaa]));
/// assert!(cache.get_cached(&BytesKey::from(vec![1])).is_some());
/// ```
pub struct ReadCache<K, V, S>
where
    K: Hash + Eq,
{
    src: Arc<S>,
    state: Mutex<CacheState<K, V>>,
    max_capacity: Option<NonZeroUsize>,
    flush_source: bool,
}

/// Read cache keyed by raw byte sequences.
pub type BytesReadCache<V, S> = ReadCache<BytesKey, V, S>;

struct CacheState<K: Hash + Eq, V> {
    entries: LruCache<K, CacheEntry<V>>,
    stats: CacheStats,
}

impl<K: Hash + Eq, V> CacheState<K, V> {
    /// Insert a key that is not cached yet as the newest entry.
    fn admit(&mut self, key: K, entry: CacheEntry<V>) {
        if self.entries.push(key, entry).is_some() {
            self.stats.evictions += 1;
            debug!(
                capacity = self.entries.cap().get(),
                evictions = self.stats.evictions,
                "Evicted oldest read cache entry"
            );
        }
    }

    /// Replace a cached entry in place, or admit it if not cached.
    fn store(&mut self, key: K, entry: CacheEntry<V>) {
        match self.entries.peek_mut(&key) {
            Some(slot) => *slot = entry,
            None => self.admit(key, entry),
        }
    }
}

impl<K, V, S> ReadCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: Source<K, V>,
{
    /// Create an unbounded cache over `src`.
    pub fn new(src: Arc<S>) -> Self {
        Self {
            src,
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                stats: CacheStats::default(),
            }),
            max_capacity: None,
            flush_source: false,
        }
    }

    /// Create a cache configured from `settings`.
    pub fn from_settings(src: Arc<S>, settings: &CacheSettings) -> LodestoneResult<Self> {
        settings.validate()?;
        let mut cache = Self::new(src).with_flush_source(settings.flush_source);
        if let Some(capacity) = settings.capacity() {
            cache = cache.with_max_capacity(capacity);
        }
        Ok(cache)
    }

    /// Bound the cache to `max` entries.
    ///
    /// If more entries are already cached, the oldest are evicted right away.
    pub fn with_max_capacity(mut self, max: NonZeroUsize) -> Self {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = state.entries.len();
        state.entries.resize(max);
        let evicted = before - state.entries.len();
        state.stats.evictions += evicted as u64;
        debug!(capacity = max.get(), evicted, "Bounded read cache capacity");
        self.max_capacity = Some(max);
        self
    }

    /// Forward [`ReadCache::flush`] to the wrapped source.
    pub fn with_flush_source(mut self, flush_source: bool) -> Self {
        self.flush_source = flush_source;
        self
    }

    /// Get the value for `key`, querying the wrapped source on a miss.
    ///
    /// A cached entry (present or absent) is returned without touching the
    /// source. On a miss the source's answer is cached, including `None`.
    /// Source errors propagate and nothing is cached.
    pub fn get(&self, key: &K) -> LodestoneResult<Option<V>> {
        let mut state = mutex_lock(&self.state, SOURCE, "get");

        if let Some(value) = state.entries.peek(key).map(|entry| entry.value().cloned()) {
            state.stats.hits += 1;
            return Ok(value);
        }

        state.stats.misses += 1;
        let value = self.src.get(key)?;
        trace!(
            present = value.is_some(),
            cached = state.entries.len(),
            "Read cache miss"
        );
        state.admit(key.clone(), CacheEntry::from(value.clone()));
        Ok(value)
    }

    /// Cached entry for `key`, if any. Never queries the source and never
    /// changes eviction order.
    pub fn get_cached(&self, key: &K) -> Option<CacheEntry<V>> {
        mutex_lock(&self.state, SOURCE, "get_cached")
            .entries
            .peek(key)
            .cloned()
    }

    /// Write `value` to the source, then cache it.
    ///
    /// A key that is already cached keeps its eviction position.
    pub fn put(&self, key: K, value: V) -> LodestoneResult<()> {
        let mut state = mutex_lock(&self.state, SOURCE, "put");
        self.src.put(key.clone(), value.clone())?;
        state.store(key, CacheEntry::Present(value));
        Ok(())
    }

    /// Delete `key` from the source, then cache it as absent.
    pub fn delete(&self, key: &K) -> LodestoneResult<()> {
        let mut state = mutex_lock(&self.state, SOURCE, "delete");
        self.src.delete(key)?;
        state.store(key.clone(), CacheEntry::Absent);
        Ok(())
    }

    /// Writes are never buffered here, so this reports `false` unless
    /// flushing is forwarded to the source.
    pub fn flush(&self) -> LodestoneResult<bool> {
        if self.flush_source {
            self.src.flush()
        } else {
            Ok(false)
        }
    }

    /// Drop the in-memory entry for `key` without touching the source.
    ///
    /// Returns true if an entry was dropped.
    pub fn invalidate(&self, key: &K) -> bool {
        mutex_lock(&self.state, SOURCE, "invalidate")
            .entries
            .pop(key)
            .is_some()
    }

    /// Drop every in-memory entry. Statistics are kept.
    pub fn clear(&self) {
        mutex_lock(&self.state, SOURCE, "clear").entries.clear();
    }
}

impl<K, V, S> ReadCache<K, V, S>
where
    K: Hash + Eq,
{
    /// The wrapped source.
    pub fn source(&self) -> &Arc<S> {
        &self.src
    }

    /// Capacity bound, `None` when unbounded.
    pub fn max_capacity(&self) -> Option<NonZeroUsize> {
        self.max_capacity
    }

    /// Number of cached entries, present and absent.
    pub fn len(&self) -> usize {
        mutex_lock(&self.state, SOURCE, "len").entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the counters, with `entry_count` taken at call time.
    pub fn stats(&self) -> CacheStats {
        let state = mutex_lock(&self.state, SOURCE, "stats");
        CacheStats {
            entry_count: state.entries.len() as u64,
            ..state.stats
        }
    }
}

impl<K, V, S> Source<K, V> for ReadCache<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
    S: Source<K, V>,
{
    fn get(&self, key: &K) -> LodestoneResult<Option<V>> {
        ReadCache::get(self, key)
    }

    fn put(&self, key: K, value: V) -> LodestoneResult<()> {
        ReadCache::put(self, key, value)
    }

    fn delete(&self, key: &K) -> LodestoneResult<()> {
        ReadCache::delete(self, key)
    }

    fn flush(&self) -> LodestoneResult<bool> {
        ReadCache::flush(self)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::memory::HashMapSource;
    use proptest::prelude::*;

    proptest! {
        /// Property: the entry count never exceeds the capacity bound.
        #[test]
        fn prop_len_within_capacity(
            capacity in 1usize..16,
            keys in proptest::collection::vec(0u16..64, 0..200),
        ) {
            let src: Arc<HashMapSource<u16, u16>> =
                Arc::new(keys.iter().map(|k| (*k, *k)).collect());
            let cache = ReadCache::new(src)
                .with_max_capacity(NonZeroUsize::new(capacity).expect("non-zero"));

            for key in &keys {
                prop_assert_eq!(cache.get(key).expect("get"), Some(*key));
                prop_assert!(cache.len() <= capacity);
            }
        }

        /// Property: every answer matches what the source held when first read.
        #[test]
        fn prop_cached_values_match_source(keys in proptest::collection::vec(0u16..32, 1..64)) {
            let src: Arc<HashMapSource<u16, u16>> =
                Arc::new((0u16..16).map(|k| (k, k * 2)).collect());
            let cache = ReadCache::new(Arc::clone(&src));

            for key in &keys {
                let expected = src.get(key).expect("get");
                prop_assert_eq!(cache.get(key).expect("get"), expected);
                prop_assert_eq!(cache.get_cached(key), Some(CacheEntry::from(expected)));
            }
        }
    }
}
