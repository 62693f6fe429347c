pub mod file_store;
pub mod memory_store;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key used when the caller supplies no correlation id.
pub const DEFAULT_WATCH_KEY: &str = "force_sync";

/// What a later status check should be watching: the connector, and the instant
/// its sync was triggered (absent for status-only checks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWatch {
    pub connector_id: String,
    pub reference_time: Option<DateTime<Utc>>,
}

impl SyncWatch {
    pub fn new(connector_id: impl Into<String>, reference_time: Option<DateTime<Utc>>) -> Self {
        SyncWatch {
            connector_id: connector_id.into(),
            reference_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchKey(String);

impl WatchKey {
    pub fn default_key() -> Self {
        WatchKey(DEFAULT_WATCH_KEY.to_string())
    }

    /// Key for an optional correlation id; blank ids fall back to the default key.
    ///
    /// Bytes outside `[A-Za-z0-9._-]` are percent-encoded, so the key is always usable as a
    /// file name and distinct ids never share a key.
    pub fn derive(correlation_id: Option<&str>) -> Self {
        match correlation_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let mut safe = String::with_capacity(id.len());
                for b in id.bytes() {
                    if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.') {
                        safe.push(char::from(b));
                    } else {
                        safe.push_str(&format!("%{:02X}", b));
                    }
                }
                WatchKey(format!("{}_{}", safe, DEFAULT_WATCH_KEY))
            }
            None => Self::default_key(),
        }
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug)]
pub enum WatchStoreError {
    #[error("Error accessing watch state {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Watch state {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable hand-off of [`SyncWatch`] records between process invocations.
///
/// Writes replace the whole record; a missing key reads back as `Ok(None)`.
#[async_trait::async_trait]
pub trait WatchStore: Send + Sync {
    async fn get(&self, key: &WatchKey) -> Result<Option<SyncWatch>, WatchStoreError>;

    async fn put(&mut self, key: &WatchKey, watch: SyncWatch) -> Result<(), WatchStoreError>;
}
