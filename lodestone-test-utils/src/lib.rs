//! Lodestone Test Utilities
//!
//! Centralized test infrastructure for the Lodestone workspace:
//! - Deterministic key and value fixtures
//! - Mock sources that count calls or fail on demand
//! - Proptest generators for keys and decoded values
//! - Custom assertions for Lodestone errors

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// Re-export core types for convenience
pub use lodestone_core::{
    CacheSettings, Decoded, DecodedValue, LodestoneError, LodestoneResult, Scalar, StorageError,
};
pub use lodestone_storage::{BytesKey, CacheEntry, HashMapSource, ReadCache, Source};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber for test output.
///
/// Honors `RUST_LOG`, defaulting to `lodestone_storage=debug`. Safe to call
/// from every test; only the first call installs anything.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lodestone_storage=debug"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

// ============================================================================
// MOCK SOURCES
// ============================================================================

/// In-memory source that counts every call made against it.
#[derive(Debug)]
pub struct CountingSource<K, V> {
    inner: HashMapSource<K, V>,
    gets: AtomicUsize,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    flushes: AtomicUsize,
    flush_result: bool,
}

impl<K: Eq + Hash, V> Default for CountingSource<K, V> {
    fn default() -> Self {
        Self::new(HashMapSource::new())
    }
}

impl<K: Eq + Hash, V> CountingSource<K, V> {
    pub fn new(inner: HashMapSource<K, V>) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
            flush_result: false,
        }
    }

    /// Value returned from every `flush` call.
    pub fn with_flush_result(mut self, flushed: bool) -> Self {
        self.flush_result = flushed;
        self
    }

    pub fn inner(&self) -> &HashMapSource<K, V> {
        &self.inner
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl<K, V> Source<K, V> for CountingSource<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> LodestoneResult<Option<V>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn put(&self, key: K, value: V) -> LodestoneResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn delete(&self, key: &K) -> LodestoneResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key)
    }

    fn flush(&self) -> LodestoneResult<bool> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(self.flush_result)
    }
}

/// In-memory source that returns `StorageError::Io` from every call while
/// failing is switched on.
#[derive(Debug)]
pub struct FailingSource<K, V> {
    inner: HashMapSource<K, V>,
    failing: AtomicBool,
}

impl<K: Eq + Hash, V> FailingSource<K, V> {
    /// A source that fails from the start.
    pub fn failing() -> Self {
        Self::healthy(HashMapSource::new()).fail(true)
    }

    /// A source that works until [`FailingSource::set_failing`] is called.
    pub fn healthy(inner: HashMapSource<K, V>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    fn fail(self, failing: bool) -> Self {
        self.set_failing(failing);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &HashMapSource<K, V> {
        &self.inner
    }

    fn check(&self, op: &str) -> LodestoneResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Io {
                reason: format!("injected {op} failure"),
            }
            .into())
        } else {
            Ok(())
        }
    }
}

impl<K, V> Source<K, V> for FailingSource<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> LodestoneResult<Option<V>> {
        self.check("get")?;
        self.inner.get(key)
    }

    fn put(&self, key: K, value: V) -> LodestoneResult<()> {
        self.check("put")?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &K) -> LodestoneResult<()> {
        self.check("delete")?;
        self.inner.delete(key)
    }

    fn flush(&self) -> LodestoneResult<bool> {
        self.check("flush")?;
        self.inner.flush()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for keys and decoded values.

    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    /// Generate a key of 0 to 48 arbitrary bytes.
    pub fn arb_bytes_key() -> impl Strategy<Value = BytesKey> {
        vec(any::<u8>(), 0..48).prop_map(BytesKey::from)
    }

    /// Generate a 32-byte hash-like key.
    pub fn arb_hash_key() -> impl Strategy<Value = BytesKey> {
        any::<[u8; 32]>().prop_map(BytesKey::from)
    }

    /// Generate a scalar leaf, textual or binary.
    pub fn arb_scalar_value() -> impl Strategy<Value = DecodedValue> {
        prop_oneof![
            (0usize..1024, vec(any::<u8>(), 0..32))
                .prop_map(|(position, bytes)| DecodedValue::bytes(position, bytes)),
            (0usize..1024, "[a-zA-Z0-9 ]{0,16}")
                .prop_map(|(position, text)| DecodedValue::text(position, text)),
        ]
    }

    /// Generate a decoded value nested up to three lists deep.
    pub fn arb_decoded_value() -> impl Strategy<Value = DecodedValue> {
        arb_scalar_value().prop_recursive(3, 32, 4, |inner| {
            (0usize..1024, vec(inner, 0..4))
                .prop_map(|(position, items)| DecodedValue::list(position, items))
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Deterministic keys, values and populated sources.

    use super::*;
    use sha2::{Digest, Sha256};

    /// Hash-derived key for `i`: SHA-256 of its big-endian bytes.
    pub fn int_to_key(i: u64) -> BytesKey {
        BytesKey::from(Sha256::digest(i.to_be_bytes()).to_vec())
    }

    /// 32-byte big-endian word holding `i`.
    pub fn int_to_value(i: u64) -> Vec<u8> {
        let mut word = vec![0u8; 32];
        word[24..].copy_from_slice(&i.to_be_bytes());
        word
    }

    /// In-memory source holding `int_to_key(i) -> int_to_value(i)` for `0..n`.
    pub fn populated_source(n: u64) -> HashMapSource<BytesKey, Vec<u8>> {
        (0..n).map(|i| (int_to_key(i), int_to_value(i))).collect()
    }

    /// Counting source over [`populated_source`].
    pub fn counting_source(n: u64) -> CountingSource<BytesKey, Vec<u8>> {
        CountingSource::new(populated_source(n))
    }

    /// Keys of `populated_source(n)` that a cache currently holds.
    pub fn cached_indices<S>(cache: &ReadCache<BytesKey, Vec<u8>, S>, n: u64) -> Vec<u64>
    where
        S: Source<BytesKey, Vec<u8>>,
    {
        (0..n)
            .filter(|i| cache.get_cached(&int_to_key(*i)).is_some())
            .collect()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for Lodestone-specific validation.

    use super::*;

    /// Assert that a LodestoneResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &LodestoneResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a LodestoneResult is a Storage error.
    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &LodestoneResult<T>) {
        match result {
            Err(LodestoneError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert that a LodestoneResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &LodestoneResult<T>) {
        match result {
            Err(LodestoneError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_int_to_key_is_deterministic() {
        assert_eq!(int_to_key(7), int_to_key(7));
        assert_ne!(int_to_key(7), int_to_key(8));
        assert_eq!(int_to_key(0).len(), 32);
    }

    #[test]
    fn test_int_to_value_is_big_endian_word() {
        let word = int_to_value(0x0102);
        assert_eq!(word.len(), 32);
        assert_eq!(&word[30..], &[0x01, 0x02]);
        assert!(word[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_counting_source_counts() {
        let src = counting_source(3);
        assert_eq!(
            src.get(&int_to_key(1)).expect("get should succeed"),
            Some(int_to_value(1))
        );
        src.put(int_to_key(9), int_to_value(9))
            .expect("put should succeed");
        src.delete(&int_to_key(9)).expect("delete should succeed");
        assert!(!src.flush().expect("flush should succeed"));

        assert_eq!(
            (src.gets(), src.puts(), src.deletes(), src.flushes()),
            (1, 1, 1, 1)
        );
    }

    #[test]
    fn test_failing_source_toggles() {
        let src = FailingSource::healthy(populated_source(2));
        assert_ok(&src.get(&int_to_key(0)));

        src.set_failing(true);
        assert_storage_error(&src.get(&int_to_key(0)));
        assert_storage_error(&src.put(int_to_key(5), vec![]));
        assert_storage_error(&src.flush());

        let always: FailingSource<BytesKey, Vec<u8>> = FailingSource::failing();
        assert_storage_error(&always.delete(&int_to_key(0)));
    }
}
