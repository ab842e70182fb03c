//! Error types for Lodestone operations

use thiserror::Error;

/// Storage layer errors.
///
/// Raised by `Source` implementations that talk to a real backing store.
/// Caches never produce these on their own; they only pass them through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("I/O error: {reason}")]
    Io { reason: String },

    #[error("Backend {backend} failed: {reason}")]
    Backend { backend: String, reason: String },
}

/// Errors produced while decoding an RLP-encoded buffer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Decode position {position} is outside of buffer of length {len}")]
    OutOfBounds { position: usize, len: usize },

    #[error("Malformed item at offset {position}: {reason}")]
    Malformed { position: usize, reason: String },
}

/// Wire protocol selection errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Eth protocol version {version} is not supported")]
    UnsupportedVersion { version: u8 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Master error type for all Lodestone errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LodestoneError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Lodestone operations.
pub type LodestoneResult<T> = Result<T, LodestoneError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_backend() {
        let err = StorageError::Backend {
            backend: "lmdb".to_string(),
            reason: "map full".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("lmdb"));
        assert!(msg.contains("map full"));
    }

    #[test]
    fn test_decode_error_display_out_of_bounds() {
        let err = DecodeError::OutOfBounds {
            position: 12,
            len: 4,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("12"));
        assert!(msg.contains("4"));
    }

    #[test]
    fn test_protocol_error_names_version() {
        let err = ProtocolError::UnsupportedVersion { version: 61 };
        assert_eq!(format!("{}", err), "Eth protocol version 61 is not supported");
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "cache.max_capacity".to_string(),
            value: "0".to_string(),
            reason: "must be greater than 0".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("cache.max_capacity"));
        assert!(msg.contains("must be greater than 0"));
    }

    #[test]
    fn test_lodestone_error_from_variants() {
        let storage = LodestoneError::from(StorageError::Io {
            reason: "disk gone".to_string(),
        });
        assert!(matches!(storage, LodestoneError::Storage(_)));

        let decode = LodestoneError::from(DecodeError::Malformed {
            position: 0,
            reason: "bad".to_string(),
        });
        assert!(matches!(decode, LodestoneError::Decode(_)));

        let protocol = LodestoneError::from(ProtocolError::UnsupportedVersion { version: 1 });
        assert!(matches!(protocol, LodestoneError::Protocol(_)));

        let config = LodestoneError::from(ConfigError::Parse {
            reason: "eof".to_string(),
        });
        assert!(matches!(config, LodestoneError::Config(_)));
    }
}
