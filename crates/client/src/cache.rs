//! File-backed key-value cache of the last seen client state.
//!
//! The file is read once when opened and rewritten in full on every
//! change. It is an offline convenience only; the server stays the source
//! of truth for the account.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ClientError;

#[derive(Debug)]
pub struct LocalCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalCache {
    /// Open the cache at `path`. A missing file is an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ClientError::Cache(format!("{} is not a valid cache file: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ClientError::Cache(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "Local cache opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store `value` under `key` and rewrite the file.
    pub fn set(&mut self, key: &str, value: String) -> Result<(), ClientError> {
        if self.entries.get(key) == Some(&value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), ClientError> {
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| ClientError::Cache(format!("Failed to encode cache: {e}")))?;
        std::fs::write(&self.path, raw).map_err(|e| {
            ClientError::Cache(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}
