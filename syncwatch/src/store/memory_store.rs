use std::collections::HashMap;

use log::info;

use crate::store::{SyncWatch, WatchKey, WatchStoreError};

use super::WatchStore;

/// Process-local store. Nothing survives the process, so this is only useful for
/// tests and for embedding the engine where trigger and check share one process.
pub struct InMemoryStore {
    watches: HashMap<WatchKey, SyncWatch>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            watches: HashMap::new(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WatchStore for InMemoryStore {
    async fn get(&self, key: &WatchKey) -> Result<Option<SyncWatch>, WatchStoreError> {
        Ok(self.watches.get(key).cloned())
    }

    async fn put(&mut self, key: &WatchKey, watch: SyncWatch) -> Result<(), WatchStoreError> {
        info!(
            "key={}; Storing watch for connector {}, reference time {:?}",
            key, watch.connector_id, watch.reference_time
        );
        self.watches.insert(key.clone(), watch);
        Ok(())
    }
}
