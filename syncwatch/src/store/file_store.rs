//! File-backed watch store.
//!
//! Layout:
//! ```text
//! {dir}/{key}.json
//! ```
//!
//! Each write lands in a uniquely named temp file that is renamed over the
//! record, so readers see either the old record or the new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use uuid::Uuid;

use crate::store::{SyncWatch, WatchKey, WatchStore, WatchStoreError};

pub struct FileWatchStore {
    dir: PathBuf,
}

impl FileWatchStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileWatchStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &WatchKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.value()))
    }

    fn io_error(key: &WatchKey, source: std::io::Error) -> WatchStoreError {
        WatchStoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl WatchStore for FileWatchStore {
    async fn get(&self, key: &WatchKey) -> Result<Option<SyncWatch>, WatchStoreError> {
        let path = self.record_path(key);
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("key={}; No watch state at {}", key, path.display());
                return Ok(None);
            }
            Err(e) => return Err(Self::io_error(key, e)),
        };

        let watch = serde_json::from_slice::<SyncWatch>(&content).map_err(|e| {
            WatchStoreError::Corrupt {
                key: key.to_string(),
                source: e,
            }
        })?;
        Ok(Some(watch))
    }

    async fn put(&mut self, key: &WatchKey, watch: SyncWatch) -> Result<(), WatchStoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(key, e))?;

        let path = self.record_path(key);
        let temp_path = self
            .dir
            .join(format!("{}.json.{}.tmp", key.value(), Uuid::new_v4()));

        let body = serde_json::to_vec_pretty(&watch).map_err(|e| WatchStoreError::Corrupt {
            key: key.to_string(),
            source: e,
        })?;

        if let Err(e) = tokio::fs::write(&temp_path, &body).await {
            tokio::fs::remove_file(&temp_path).await.ok();
            return Err(Self::io_error(key, e));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            tokio::fs::remove_file(&temp_path).await.ok();
            return Err(Self::io_error(key, e));
        }

        info!(
            "key={}; Stored watch for connector {} at {}",
            key,
            watch.connector_id,
            path.display()
        );
        Ok(())
    }
}
