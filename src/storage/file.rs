//! File-backed key-value store

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::KeyValueStore;
use crate::error::StoreError;

/// Stores each key as `<data_dir>/<key>.json`
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so a crash mid-write never leaves a truncated snapshot behind.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).await.map_err(io_err)?;
        fs::rename(&tmp_path, &path).await.map_err(io_err)?;

        tracing::trace!(key, bytes = value.len(), path = %path.display(), "Stored value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("rentedMovies").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set("rentedMovies", "[1,2]").await.unwrap();
        assert_eq!(store.get("rentedMovies").await.unwrap().as_deref(), Some("[1,2]"));

        store.set("rentedMovies", "[]").await.unwrap();
        assert_eq!(store.get("rentedMovies").await.unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join("nested/rentedMovies.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.set("../escape", "x").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get("").await, Err(StoreError::InvalidKey(_))));
    }
}
