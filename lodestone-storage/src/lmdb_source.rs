//! LMDB-backed `Source`.
//!
//! Uses the heed crate (Rust bindings for LMDB) to store raw key and value
//! bytes in a single unnamed database.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The source uses:
//! - Read transactions for `get`
//! - One committed write transaction per `put` and `delete`
//!
//! Nothing is buffered, so [`Source::flush`] reports `false`.

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use lodestone_core::{LmdbSettings, LodestoneError, LodestoneResult, StorageError};
use tracing::debug;

use crate::cache::BytesKey;
use crate::source::Source;

/// Error type for LMDB source operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbSourceError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbSourceError> for LodestoneError {
    fn from(e: LmdbSourceError) -> Self {
        match e {
            LmdbSourceError::Io(io) => StorageError::Io {
                reason: io.to_string(),
            },
            other => StorageError::Backend {
                backend: "lmdb".to_string(),
                reason: other.to_string(),
            },
        }
        .into()
    }
}

/// Persistent byte store on an LMDB environment.
///
/// # Example
///
/// ```ignore
/// use lodestone_storage::{BytesKey, LmdbSource, Source};
///
/// let source = LmdbSource::new("/var/lib/node/db", 1024)?;
/// source.put(BytesKey::from(vec![1, 2]), vec![0xaa])?;
/// assert_eq!(source.get(&BytesKey::from(vec![1, 2]))?, Some(vec![0xaa]));
/// ```
pub struct LmdbSource {
    env: Env,
    db: Database<Bytes, Bytes>,
    path: PathBuf,
}

impl LmdbSource {
    /// Open (or create) an LMDB source.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The map size in bytes overflows `usize`
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbSourceError> {
        let map_size = max_size_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            LmdbSourceError::EnvOpen(format!("map size of {max_size_mb} MB overflows usize"))
        })?;

        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbSourceError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbSourceError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        debug!(
            path = %path.as_ref().display(),
            max_size_mb,
            "Opened LMDB source"
        );

        Ok(Self {
            env,
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Open a source from validated settings.
    pub fn from_settings(settings: &LmdbSettings) -> LodestoneResult<Self> {
        settings.validate()?;
        Ok(Self::new(&settings.path, settings.max_size_mb)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<u64, LmdbSourceError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;
        self.db
            .len(&rtxn)
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, LmdbSourceError> {
        Ok(self.len()? == 0)
    }
}

impl Source<BytesKey, Vec<u8>> for LmdbSource {
    fn get(&self, key: &BytesKey) -> LodestoneResult<Option<Vec<u8>>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        let value = self
            .db
            .get(&rtxn, key.as_bytes())
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        Ok(value.map(<[u8]>::to_vec))
    }

    fn put(&self, key: BytesKey, value: Vec<u8>) -> LodestoneResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, key.as_bytes(), &value)
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &BytesKey) -> LodestoneResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        self.db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbSourceError::Transaction(e.to_string()))?;
        Ok(())
    }

    fn flush(&self) -> LodestoneResult<bool> {
        Ok(false)
    }
}
