//! Decoded value model for RLP-encoded buffers.
//!
//! Decoding is a forward-only scan over a byte buffer: every item records the
//! offset just past its last byte, so a caller can resume decoding at
//! [`DecodedValue::position`]. Items are either a scalar (a byte string, or
//! text when the producer knows the payload is textual) or a list of nested
//! items, to arbitrary depth.

use std::fmt;

use rlp::Rlp;

use crate::{DecodeError, LodestoneResult};

/// Maximum number of nested list levels [`DecodedValue::decode`] accepts.
pub const MAX_NESTING_DEPTH: usize = 1024;

/// A scalar payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Payload known to be textual; rendered verbatim.
    Text(String),
    /// Opaque binary payload; rendered as lower-case hex.
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Raw bytes of the scalar, regardless of how it renders.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Scalar::Text(text) => text.as_bytes(),
            Scalar::Bytes(bytes) => bytes,
        }
    }
}

/// Shape of a decoded item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decoded {
    Scalar(Scalar),
    List(Vec<DecodedValue>),
}

/// Result of decoding one item, paired with the end offset in the source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedValue {
    position: usize,
    decoded: Decoded,
}

impl DecodedValue {
    /// Build a value from its parts.
    pub fn new(position: usize, decoded: Decoded) -> Self {
        Self { position, decoded }
    }

    /// An opaque byte-string scalar ending at `position`.
    pub fn bytes(position: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(position, Decoded::Scalar(Scalar::Bytes(bytes.into())))
    }

    /// A textual scalar ending at `position`.
    pub fn text(position: usize, text: impl Into<String>) -> Self {
        Self::new(position, Decoded::Scalar(Scalar::Text(text.into())))
    }

    /// A list ending at `position`.
    pub fn list(position: usize, items: Vec<DecodedValue>) -> Self {
        Self::new(position, Decoded::List(items))
    }

    /// Decode a single RLP item starting at byte offset `pos` of `data`.
    ///
    /// Byte strings decode to [`Scalar::Bytes`]; lists decode recursively and
    /// every element carries its own end offset. Truncated or overrunning
    /// input, or lists nested deeper than [`MAX_NESTING_DEPTH`], yield a
    /// [`DecodeError`].
    pub fn decode(data: &[u8], pos: usize) -> LodestoneResult<Self> {
        Ok(decode_at(data, pos, 0)?)
    }

    /// Offset just past the last byte consumed for this item.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn decoded(&self) -> &Decoded {
        &self.decoded
    }

    pub fn into_decoded(self) -> Decoded {
        self.decoded
    }

    pub fn is_list(&self) -> bool {
        matches!(self.decoded, Decoded::List(_))
    }

    /// Scalar payload bytes, or `None` for a list.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.decoded {
            Decoded::Scalar(scalar) => Some(scalar.as_bytes()),
            Decoded::List(_) => None,
        }
    }

    /// List elements, or `None` for a scalar.
    pub fn as_list(&self) -> Option<&[DecodedValue]> {
        match &self.decoded {
            Decoded::List(items) => Some(items),
            Decoded::Scalar(_) => None,
        }
    }

    /// Render the value as text.
    ///
    /// Text scalars render verbatim, byte scalars as hex, and lists as the
    /// concatenation of their elements in order.
    pub fn as_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        match &self.decoded {
            Decoded::Scalar(Scalar::Text(text)) => out.push_str(text),
            Decoded::Scalar(Scalar::Bytes(bytes)) => out.push_str(&hex::encode(bytes)),
            Decoded::List(items) => {
                for item in items {
                    item.write_text(out);
                }
            }
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

fn decode_at(data: &[u8], pos: usize, depth: usize) -> Result<DecodedValue, DecodeError> {
    if pos >= data.len() {
        return Err(DecodeError::OutOfBounds {
            position: pos,
            len: data.len(),
        });
    }

    let rlp = Rlp::new(&data[pos..]);
    let info = rlp.payload_info().map_err(|e| DecodeError::Malformed {
        position: pos,
        reason: e.to_string(),
    })?;

    let payload_start = pos + info.header_len;
    let end = payload_start
        .checked_add(info.value_len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| DecodeError::Malformed {
            position: pos,
            reason: format!(
                "item of {} bytes overruns buffer of length {}",
                info.header_len + info.value_len,
                data.len()
            ),
        })?;

    if !rlp.is_list() {
        return Ok(DecodedValue::bytes(end, &data[payload_start..end]));
    }

    if depth >= MAX_NESTING_DEPTH {
        return Err(DecodeError::Malformed {
            position: pos,
            reason: format!("nesting too deep (limit {MAX_NESTING_DEPTH})"),
        });
    }

    let mut items = Vec::new();
    let mut cursor = payload_start;
    while cursor < end {
        let item = decode_at(&data[..end], cursor, depth + 1)?;
        cursor = item.position();
        items.push(item);
    }

    Ok(DecodedValue::list(end, items))
}
