use std::num::NonZeroUsize;
use std::sync::Arc;

use lodestone_core::DecodedValue;
use lodestone_storage::{BytesKey, BytesReadCache, CacheEntry, HashMapSource, ReadCache};
use lodestone_test_utils::generators::{arb_bytes_key, arb_decoded_value, arb_hash_key};
use proptest::collection::{hash_map, vec};
use proptest::prelude::*;

type DecodedSource = HashMapSource<BytesKey, DecodedValue>;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: decoded values come back from the cache exactly as stored,
    /// and their text rendering survives the trip.
    #[test]
    fn prop_decoded_values_read_through(
        entries in hash_map(arb_hash_key(), arb_decoded_value(), 1..24),
    ) {
        let src: Arc<DecodedSource> = Arc::new(entries.clone().into_iter().collect());
        let cache: BytesReadCache<DecodedValue, DecodedSource> = ReadCache::new(Arc::clone(&src));

        for (key, value) in &entries {
            let fetched = cache.get(key).expect("cache get");
            prop_assert_eq!(fetched.as_ref(), Some(value));
            prop_assert_eq!(
                fetched.map(|v| v.as_text()),
                Some(value.as_text())
            );
        }
        prop_assert_eq!(cache.len(), entries.len());
    }

    /// Property: a key with equal content but a fresh buffer hits the cache.
    #[test]
    fn prop_equal_content_keys_hit(key in arb_bytes_key(), value in arb_decoded_value()) {
        let src: Arc<DecodedSource> = Arc::new(HashMapSource::new());
        let cache = ReadCache::new(Arc::clone(&src));

        cache.put(key.clone(), value.clone()).expect("cache put");
        let copy = BytesKey::from(key.as_bytes().to_vec());
        prop_assert_eq!(cache.get_cached(&copy), Some(CacheEntry::Present(value)));
        prop_assert_eq!(cache.stats().misses, 0);
    }

    /// Property: with any capacity and access pattern, cached entries are the
    /// most recently admitted distinct keys, and hits never reorder them.
    #[test]
    fn prop_bounded_cache_holds_newest_admissions(
        capacity in 1usize..8,
        accesses in vec(0usize..16, 1..64),
    ) {
        let keys: Vec<BytesKey> = (0u8..16).map(|i| BytesKey::from(vec![i])).collect();
        let src: Arc<DecodedSource> = Arc::new(
            keys.iter()
                .enumerate()
                .map(|(i, k)| (k.clone(), DecodedValue::bytes(i + 1, vec![i as u8])))
                .collect(),
        );
        let cache = ReadCache::new(Arc::clone(&src))
            .with_max_capacity(NonZeroUsize::new(capacity).expect("non-zero"));

        // Admission order model: a key joins at the back only on a miss
        let mut admitted: Vec<usize> = Vec::new();
        for &i in &accesses {
            if !admitted.contains(&i) {
                admitted.push(i);
                if admitted.len() > capacity {
                    admitted.remove(0);
                }
            }
            cache.get(&keys[i]).expect("cache get");
        }

        for (i, key) in keys.iter().enumerate() {
            prop_assert_eq!(cache.get_cached(key).is_some(), admitted.contains(&i));
        }
    }
}
