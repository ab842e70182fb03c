//! Cached lookup outcomes.

/// Outcome of a lookup that the cache remembers.
///
/// Wrapped in an `Option`, this gives the three states the cache needs:
/// `None` (never looked up or evicted), `Some(Absent)` (looked up, the source
/// had nothing) and `Some(Present(v))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheEntry<V> {
    Present(V),
    Absent,
}

impl<V> CacheEntry<V> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The cached value, or `None` if the key is cached as absent.
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<V> From<Option<V>> for CacheEntry<V> {
    fn from(value: Option<V>) -> Self {
        match value {
            Some(value) => Self::Present(value),
            None => Self::Absent,
        }
    }
}
