//! Byte-sequence cache keys with value semantics.
//!
//! Raw byte buffers used as map keys must compare and hash by content.
//! `BytesKey` owns its bytes and exposes no mutable access, so a key cannot
//! change after it has been inserted into a map.

use std::borrow::Borrow;
use std::fmt;

/// Owning wrapper around a byte sequence used as a cache or source key.
///
/// Two keys are equal iff their bytes are element-wise equal, and equal keys
/// hash identically. Ordering is lexicographic over the bytes, which matches
/// LMDB's default key order.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BytesKey(Box<[u8]>);

impl BytesKey {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0.into_vec()
    }
}

impl From<Vec<u8>> for BytesKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl From<&[u8]> for BytesKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }
}

impl<const N: usize> From<[u8; N]> for BytesKey {
    fn from(bytes: [u8; N]) -> Self {
        Self(Box::new(bytes))
    }
}

impl AsRef<[u8]> for BytesKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for BytesKey {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BytesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BytesKey({})", hex::encode(&self.0))
    }
}

impl fmt::Display for BytesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}
