use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::connector::{ConnectorApi, ConnectorError, ConnectorSnapshot, TriggerReceipt};

/// Connector double that replays queued responses in order.
pub struct ScriptedConnector {
    snapshots: Mutex<VecDeque<Result<ConnectorSnapshot, ConnectorError>>>,
    receipts: Mutex<VecDeque<Result<TriggerReceipt, ConnectorError>>>,
    pub fetches: AtomicUsize,
    pub triggers: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        ScriptedConnector {
            snapshots: Mutex::new(VecDeque::new()),
            receipts: Mutex::new(VecDeque::new()),
            fetches: AtomicUsize::new(0),
            triggers: AtomicUsize::new(0),
        }
    }

    pub fn with_snapshot(
        self,
        last_success: Option<DateTime<Utc>>,
        last_failure: Option<DateTime<Utc>>,
    ) -> Self {
        self.snapshots.lock().unwrap().push_back(Ok(ConnectorSnapshot {
            connector_id: "conn".to_string(),
            last_success,
            last_failure,
            status_code: "Success".to_string(),
            status_message: None,
        }));
        self
    }

    pub fn with_fetch_error(self, error: ConnectorError) -> Self {
        self.snapshots.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_receipt(self, accepted: bool, message: &str) -> Self {
        self.receipts.lock().unwrap().push_back(Ok(TriggerReceipt {
            accepted,
            status_code: if accepted { "Success" } else { "Rejected" }.to_string(),
            message: Some(message.to_string()),
        }));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ConnectorApi for ScriptedConnector {
    async fn fetch_details(&self, _connector_id: &str) -> Result<ConnectorSnapshot, ConnectorError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted snapshot left")
    }

    async fn trigger_sync(&self, _connector_id: &str) -> Result<TriggerReceipt, ConnectorError> {
        self.triggers.fetch_add(1, Ordering::SeqCst);
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted receipt left")
    }
}
