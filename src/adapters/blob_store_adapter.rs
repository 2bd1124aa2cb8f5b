//! Blob store implementations: one directory-backed, one in memory.

use crate::domain::error::DcaError;
use crate::ports::blob_store::BlobStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Stores each blob as a file named after its key under `base_path`.
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, DcaError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(DcaError::PriceData {
                reason: format!("invalid cache key {:?}", key),
            });
        }
        Ok(self.base_path.join(key))
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DcaError> {
        let path = self.blob_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), DcaError> {
        let path = self.blob_path(key)?;
        fs::create_dir_all(&self.base_path)?;
        fs::write(path, value)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DcaError> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), DcaError> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fs_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path().join("cache"));

        assert_eq!(store.get("BTCUSDT.csv").unwrap(), None);
        store.put("BTCUSDT.csv", b"timestamp,price\n").unwrap();
        assert_eq!(
            store.get("BTCUSDT.csv").unwrap(),
            Some(b"timestamp,price\n".to_vec())
        );
    }

    #[test]
    fn fs_store_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf());
        assert!(store.put("../escape", b"x").is_err());
        assert!(store.get("a/b").is_err());
        assert!(store.get("").is_err());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        assert!(store.is_empty());
        store.put("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("other").unwrap(), None);
    }
}
