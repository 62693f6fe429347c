use tokio::sync::RwLock;

use crate::{Clock, SystemClock, connector::ConnectorApi, store::WatchStore};

/// Collaborators shared by the trigger and status-check entry points.
pub struct Env {
    pub store: RwLock<Box<dyn WatchStore>>,
    pub connector: Box<dyn ConnectorApi>,
    pub clock: Box<dyn Clock>,
}

impl Env {
    pub fn new(store: Box<dyn WatchStore>, connector: Box<dyn ConnectorApi>) -> Self {
        Env {
            store: RwLock::new(store),
            connector,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn get_store(&self) -> &RwLock<Box<dyn WatchStore>> {
        &self.store
    }

    pub fn get_connector(&self) -> &dyn ConnectorApi {
        self.connector.as_ref()
    }

    pub fn get_clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
