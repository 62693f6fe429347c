use std::path::PathBuf;

use log::info;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Error writing artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error serializing artifact {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Keeps a copy of every upstream response body for later audit.
#[async_trait::async_trait]
pub trait ArtifactRecorder: Send + Sync {
    async fn record(&self, name: &str, body: &serde_json::Value) -> Result<(), ArtifactError>;
}

pub fn connector_response_name(connector_id: &str) -> String {
    format!("connector_{}_response.json", connector_id)
}

pub fn sync_response_name(connector_id: &str) -> String {
    format!("sync_{}_response.json", connector_id)
}

/// Writes pretty-printed JSON into a responses directory, replacing older copies.
pub struct FileArtifactRecorder {
    pub dir: PathBuf,
}

impl FileArtifactRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileArtifactRecorder { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl ArtifactRecorder for FileArtifactRecorder {
    async fn record(&self, name: &str, body: &serde_json::Value) -> Result<(), ArtifactError> {
        let path = self.dir.join(name);
        let io_error = |source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_error)?;

        let json = serde_json::to_string_pretty(body).map_err(|e| ArtifactError::Serialize {
            name: name.to_string(),
            source: e,
        })?;
        tokio::fs::write(&path, json).await.map_err(io_error)?;

        info!("Response stored at {}", path.display());
        Ok(())
    }
}

/// Drops every response.
pub struct NoopRecorder;

#[async_trait::async_trait]
impl ArtifactRecorder for NoopRecorder {
    async fn record(&self, _name: &str, _body: &serde_json::Value) -> Result<(), ArtifactError> {
        Ok(())
    }
}
