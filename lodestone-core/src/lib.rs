//! Lodestone Core - Shared Types
//!
//! Error hierarchy, datasource configuration, the decoded-value model
//! produced by the RLP decoder, and the Eth protocol handler registry.
//! Every other Lodestone crate depends on this one.

pub mod config;
pub mod decoded;
pub mod error;
pub mod protocol;

pub use config::{CacheSettings, DatasourceConfig, LmdbSettings};
pub use decoded::{Decoded, DecodedValue, Scalar, MAX_NESTING_DEPTH};
pub use error::{
    ConfigError, DecodeError, LodestoneError, LodestoneResult, ProtocolError, StorageError,
};
pub use protocol::{EthHandler, EthVersion, HandlerRegistry};
