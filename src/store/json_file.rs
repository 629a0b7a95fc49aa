//! File-backed Account Store
//!
//! Each account lives in its own `<id>.json` document inside a data
//! directory. Writes go to a temporary file in the same directory which is
//! then renamed over the target, so a concurrent `load` sees either the old
//! document or the new one. Distinct accounts never share a file, so a write
//! never has to reload and merge another account's state.
//!
//! # Layout
//!
//! ```text
//! data/
//!   alice.json   {"id":"alice","balance":"80","transactions":[...]}
//!   bob.json
//! ```

use crate::core::traits::AccountStore;
use crate::types::{Account, StoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const EXTENSION: &str = "json";

/// Durable store with one JSON document per account
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "opened JSON account store");
        Ok(Self { dir })
    }

    /// Directory holding the account documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map an account id to its document path
    ///
    /// Ids that could escape the data directory or collide with temporary
    /// files are rejected.
    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let invalid = id.is_empty()
            || id.starts_with('.')
            || id.contains(['/', '\\', '\0']);
        if invalid {
            return Err(StoreError::InvalidKey { key: id.to_string() });
        }
        Ok(self.dir.join(format!("{}.{}", id, EXTENSION)))
    }
}

impl AccountStore for JsonFileStore {
    fn load(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let path = self.path_for(id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, id: &str, account: &Account) -> Result<(), StoreError> {
        let path = self.path_for(id)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, account)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::trace!(account = id, path = %path.display(), "account document written");
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let bytes = fs::read(&path)?;
            accounts.push(serde_json::from_slice::<Account>(&bytes)?);
        }
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }
}
