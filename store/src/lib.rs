//! Sled-backed ledger store for governance records
//!
//! A thin ordered key-value layer: opaque byte keys map to whole-record
//! byte values. A `put` fully replaces prior content for its key, and
//! `get` on an absent key reports absence explicitly so callers can
//! tell "no record" apart from "zero-valued record". Multi-record
//! commits go through [`LedgerStore::put_many`], which applies every
//! write as a single sled batch.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Ordered key-value store holding every persisted governance record.
///
/// Cheap to clone; clones share the same underlying database, so the
/// membership ledger and the governance engine can hold independent
/// handles to one ledger.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    db: sled::Db,
    path: String,
}

impl LedgerStore {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = sled::open(&path)?;
        Ok(LedgerStore { db, path: path_str })
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Write one record, replacing any prior value for the key.
    pub fn put(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.db.insert(key, value)?;
        // Flush to disk to ensure durability after every committed command
        self.db.flush()?;
        Ok(())
    }

    /// Apply several writes as one indivisible batch.
    ///
    /// Either every entry becomes visible or none does; used for
    /// commands that must update more than one record together.
    pub fn put_many(&self, entries: Vec<(Vec<u8>, Vec<u8>)>) -> Result<()> {
        let mut batch = sled::Batch::default();
        for (key, value) in entries {
            batch.insert(key, value);
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }

    /// Read a record if present.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.db.get(key)? {
            Some(value) => Ok(Some(value.to_vec())),
            None => Ok(None),
        }
    }

    /// Check whether a record exists without reading it.
    pub fn exists(&self, key: &[u8]) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }
}
