use chrono::{DateTime, Utc};
use log::{error, info};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::connector::{ConnectorError, TriggerReceipt};
use crate::env::Env;
use crate::poll::{PollDriver, PollError, PollOptions};
use crate::status::SyncOutcome;
use crate::store::{SyncWatch, WatchKey, WatchStoreError};

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Sync trigger for connector {connector_id} rejected ({code}): {message}")]
    Rejected {
        connector_id: String,
        code: String,
        message: String,
    },
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    #[error(transparent)]
    Store(#[from] WatchStoreError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

#[derive(Debug, Clone)]
pub struct TriggeredSync {
    pub receipt: TriggerReceipt,
    pub reference_time: DateTime<Utc>,
    pub key: WatchKey,
}

pub struct TriggerOrchestrator<'a> {
    env: &'a Env,
}

impl<'a> TriggerOrchestrator<'a> {
    pub fn new(env: &'a Env) -> Self {
        TriggerOrchestrator { env }
    }

    /// Force a sync and record what a later status check should watch.
    ///
    /// The reference time is taken after the upstream accepted the trigger, and the
    /// watch is stored before returning. A rejected trigger stores nothing.
    pub async fn trigger(
        &self,
        connector_id: &str,
        correlation_id: Option<&str>,
    ) -> Result<TriggeredSync, TriggerError> {
        let receipt = self.env.get_connector().trigger_sync(connector_id).await?;

        if !receipt.accepted {
            let message = receipt.message.clone().unwrap_or_default();
            error!(
                "connector={}; Sync trigger rejected: {}",
                connector_id, &message
            );
            return Err(TriggerError::Rejected {
                connector_id: connector_id.to_string(),
                code: receipt.status_code,
                message,
            });
        }

        let reference_time = self.env.get_clock().now();
        let key = WatchKey::derive(correlation_id);
        {
            let mut store = self.env.get_store().write().await;
            store
                .put(&key, SyncWatch::new(connector_id, Some(reference_time)))
                .await?;
        }

        info!(
            "connector={}; Sync triggered at {}, watch key {}",
            connector_id, reference_time, key
        );

        Ok(TriggeredSync {
            receipt,
            reference_time,
            key,
        })
    }

    /// Trigger, then poll against the captured reference time until the driver returns.
    pub async fn trigger_and_wait(
        &self,
        connector_id: &str,
        correlation_id: Option<&str>,
        options: &PollOptions,
        cancel: CancellationToken,
    ) -> Result<(TriggeredSync, SyncOutcome), TriggerError> {
        let triggered = self.trigger(connector_id, correlation_id).await?;
        let driver = PollDriver::new(self.env.get_connector(), cancel);
        let outcome = driver
            .resolve(connector_id, Some(triggered.reference_time), options)
            .await?;
        Ok((triggered, outcome))
    }
}
