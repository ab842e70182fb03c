//! Configuration types

use std::num::NonZeroUsize;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LodestoneError, LodestoneResult};

const DEFAULT_LMDB_MAX_SIZE_MB: usize = 1024;
const BYTES_PER_MB: usize = 1024 * 1024;

/// Read cache settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of cached entries. `None` keeps every entry.
    pub max_capacity: Option<usize>,
    /// Forward `flush` to the wrapped source.
    pub flush_source: bool,
}

impl CacheSettings {
    /// Unbounded cache, flush not forwarded.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Cache bounded to `max_capacity` entries.
    pub fn bounded(max_capacity: usize) -> Self {
        Self {
            max_capacity: Some(max_capacity),
            ..Self::default()
        }
    }

    /// Capacity as a non-zero count, `None` when unbounded or zero.
    ///
    /// Call [`CacheSettings::validate`] first if a zero capacity must be
    /// reported rather than treated as unbounded.
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.max_capacity.and_then(NonZeroUsize::new)
    }

    pub fn validate(&self) -> LodestoneResult<()> {
        if self.max_capacity == Some(0) {
            return Err(LodestoneError::Config(ConfigError::InvalidValue {
                field: "cache.max_capacity".to_string(),
                value: "0".to_string(),
                reason: "max_capacity must be greater than 0 (omit it for an unbounded cache)"
                    .to_string(),
            }));
        }
        Ok(())
    }
}

/// LMDB environment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmdbSettings {
    /// Directory holding the LMDB files. Created if missing.
    pub path: PathBuf,
    /// Map size in megabytes.
    #[serde(default = "default_lmdb_max_size_mb")]
    pub max_size_mb: usize,
}

fn default_lmdb_max_size_mb() -> usize {
    DEFAULT_LMDB_MAX_SIZE_MB
}

impl LmdbSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size_mb: DEFAULT_LMDB_MAX_SIZE_MB,
        }
    }

    pub fn with_max_size_mb(mut self, max_size_mb: usize) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }

    /// Map size in bytes, `None` if it does not fit in `usize`.
    pub fn map_size_bytes(&self) -> Option<usize> {
        self.max_size_mb.checked_mul(BYTES_PER_MB)
    }

    pub fn validate(&self) -> LodestoneResult<()> {
        if self.max_size_mb == 0 {
            return Err(LodestoneError::Config(ConfigError::InvalidValue {
                field: "lmdb.max_size_mb".to_string(),
                value: "0".to_string(),
                reason: "max_size_mb must be greater than 0".to_string(),
            }));
        }
        if self.map_size_bytes().is_none() {
            return Err(LodestoneError::Config(ConfigError::InvalidValue {
                field: "lmdb.max_size_mb".to_string(),
                value: self.max_size_mb.to_string(),
                reason: "map size in bytes overflows usize".to_string(),
            }));
        }
        if self.path.as_os_str().is_empty() {
            return Err(LodestoneError::Config(ConfigError::InvalidValue {
                field: "lmdb.path".to_string(),
                value: String::new(),
                reason: "path must not be empty".to_string(),
            }));
        }
        Ok(())
    }
}

/// Master datasource configuration.
///
/// ```toml
/// [cache]
/// max_capacity = 100
/// flush_source = false
///
/// [lmdb]
/// path = "/var/lib/node/db"
/// max_size_mb = 1024
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub lmdb: Option<LmdbSettings>,
}

impl DatasourceConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(input: &str) -> LodestoneResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| {
            LodestoneError::Config(ConfigError::Parse {
                reason: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(LodestoneError::Config) if invalid.
    pub fn validate(&self) -> LodestoneResult<()> {
        self.cache.validate()?;
        if let Some(lmdb) = &self.lmdb {
            lmdb.validate()?;
        }
        Ok(())
    }
}
