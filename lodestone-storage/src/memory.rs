//! In-memory `Source` backed by a hash map.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use lodestone_core::LodestoneResult;

use crate::lock::{rw_read, rw_write};
use crate::source::Source;

const SOURCE: &str = "storage::memory";

/// Hash-map backed source.
///
/// Writes are applied immediately, so [`Source::flush`] always reports
/// `false`.
#[derive(Debug)]
pub struct HashMapSource<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for HashMapSource<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> HashMapSource<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}

impl<K, V> FromIterator<(K, V)> for HashMapSource<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl<K, V> Source<K, V> for HashMapSource<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> LodestoneResult<Option<V>> {
        Ok(rw_read(&self.entries, SOURCE, "get").get(key).cloned())
    }

    fn put(&self, key: K, value: V) -> LodestoneResult<()> {
        rw_write(&self.entries, SOURCE, "put").insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &K) -> LodestoneResult<()> {
        rw_write(&self.entries, SOURCE, "delete").remove(key);
        Ok(())
    }

    fn flush(&self) -> LodestoneResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let source = HashMapSource::new();
        source.put("a", 1).expect("put should succeed");
        assert_eq!(source.get(&"a").expect("get should succeed"), Some(1));

        source.delete(&"a").expect("delete should succeed");
        assert_eq!(source.get(&"a").expect("get should succeed"), None);
        assert!(source.is_empty());
    }

    #[test]
    fn test_put_is_idempotent() {
        let source = HashMapSource::new();
        source.put(7u32, "x").expect("put should succeed");
        source.put(7u32, "x").expect("put should succeed");
        assert_eq!(source.len(), 1);
        assert_eq!(source.get(&7).expect("get should succeed"), Some("x"));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let source: HashMapSource<u32, u32> = HashMapSource::new();
        assert!(source.delete(&42).is_ok());
    }

    #[test]
    fn test_flush_reports_nothing_pushed() {
        let source: HashMapSource<u32, u32> = [(1, 1), (2, 2)].into_iter().collect();
        assert_eq!(source.len(), 2);
        assert!(!source.flush().expect("flush should succeed"));
    }
}
