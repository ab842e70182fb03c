//! The key-value `Source` contract.
//!
//! Every storage-backed or cache-backed component implements [`Source`], so
//! layers can be stacked transparently: an in-memory map, an LMDB
//! environment or another cache all look the same to the layer above.

use std::sync::Arc;

use lodestone_core::LodestoneResult;

/// Key-value store with an explicit flush.
///
/// # Contract
///
/// - `get` returns the current value, or `None` if the key is unset.
/// - `put` is idempotent: writing the same value twice is observably the same
///   as writing it once.
/// - `delete` of a missing key is a no-op, not an error.
/// - `flush` pushes buffered local changes to the next layer down and returns
///   `true` iff something was pushed. Layers with no buffering return `false`.
///
/// Implementations backed by I/O report failures through the returned
/// result. Decorators pass those errors through unchanged and never retry.
///
/// Methods take `&self`; implementations use interior mutability so one
/// source can be shared (`Arc`) between a decorator and direct callers.
pub trait Source<K, V>: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &K) -> LodestoneResult<Option<V>>;

    /// Associate `key` with `value`.
    fn put(&self, key: K, value: V) -> LodestoneResult<()>;

    /// Remove any association for `key`.
    fn delete(&self, key: &K) -> LodestoneResult<()>;

    /// Push buffered changes downstream, reporting whether anything was pushed.
    fn flush(&self) -> LodestoneResult<bool>;
}

impl<K, V, S> Source<K, V> for Arc<S>
where
    S: Source<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> LodestoneResult<Option<V>> {
        (**self).get(key)
    }

    fn put(&self, key: K, value: V) -> LodestoneResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &K) -> LodestoneResult<()> {
        (**self).delete(key)
    }

    fn flush(&self) -> LodestoneResult<bool> {
        (**self).flush()
    }
}

impl<K, V, S> Source<K, V> for &S
where
    S: Source<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> LodestoneResult<Option<V>> {
        (**self).get(key)
    }

    fn put(&self, key: K, value: V) -> LodestoneResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &K) -> LodestoneResult<()> {
        (**self).delete(key)
    }

    fn flush(&self) -> LodestoneResult<bool> {
        (**self).flush()
    }
}
