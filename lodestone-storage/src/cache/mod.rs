//! Read-through cache layer.
//!
//! [`ReadCache`] decorates any [`Source`](crate::Source) and remembers every
//! lookup result, including lookups that found nothing. It never notices
//! changes made behind its back; callers that write to the wrapped source
//! directly accept stale reads until the entry is evicted or invalidated.
//!
//! # Example
//!
//! ```ignore
//! let lmdb = Arc::new(LmdbSource::new("/var/lib/node/db", 1024)?);
//! let cache = ReadCache::new(lmdb).with_max_capacity(NonZeroUsize::new(100).unwrap());
//!
//! let value = cache.get(&BytesKey::from(hash))?;
//! ```

pub mod bytes_key;
pub mod entry;
pub mod read_cache;
pub mod stats;

pub use bytes_key::BytesKey;
pub use entry::CacheEntry;
pub use read_cache::{BytesReadCache, ReadCache};
pub use stats::CacheStats;
