//! Lodestone Storage - Source Contract and Caches
//!
//! Defines the key-value [`Source`] abstraction shared by every datasource
//! layer, the [`ReadCache`] decorator, and the in-memory and LMDB backing
//! stores.

pub mod cache;
mod lock;
pub mod lmdb_source;
pub mod memory;
pub mod source;

pub use cache::{BytesKey, BytesReadCache, CacheEntry, CacheStats, ReadCache};
pub use lmdb_source::{LmdbSource, LmdbSourceError};
pub use memory::HashMapSource;
pub use source::Source;
