use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use thiserror::Error;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::connector::{ConnectorApi, ConnectorError, ConnectorSnapshot};
use crate::status::{SyncOutcome, evaluate};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    #[error("Polling cancelled after {iterations} checks")]
    Cancelled { iterations: u64 },
    #[error("Sync did not finish within {deadline:?} ({iterations} checks)")]
    DeadlineExceeded { deadline: Duration, iterations: u64 },
}

#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Keep polling through `Pending` instead of returning it.
    pub blocking: bool,
    pub interval: Duration,
    /// Overall budget for a blocking resolve. `None` polls until a terminal outcome.
    pub deadline: Option<Duration>,
}

impl PollOptions {
    pub fn single_check() -> Self {
        PollOptions {
            blocking: false,
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }

    pub fn blocking(interval: Duration) -> Self {
        PollOptions {
            blocking: true,
            interval,
            deadline: None,
        }
    }
}

/// Drives `fetch -> evaluate -> (return | sleep)` for one connector.
pub struct PollDriver<'a> {
    connector: &'a dyn ConnectorApi,
    cancel: CancellationToken,
}

enum Wait {
    Elapsed,
    Cancelled,
    DeadlineReached,
}

impl<'a> PollDriver<'a> {
    pub fn new(connector: &'a dyn ConnectorApi, cancel: CancellationToken) -> Self {
        PollDriver { connector, cancel }
    }

    /// Resolve the sync state of `connector_id` against `reference_time`.
    ///
    /// A non-blocking resolve does exactly one fetch and may return `Pending`. A blocking
    /// resolve only returns `Succeeded` or `Failed`, sleeping `interval` between fetches.
    /// Connector errors end the loop at once and are never retried here.
    pub async fn resolve(
        &self,
        connector_id: &str,
        reference_time: Option<DateTime<Utc>>,
        options: &PollOptions,
    ) -> Result<SyncOutcome, PollError> {
        let deadline_at = options.deadline.map(|d| Instant::now() + d);
        let mut iterations: u64 = 0;

        loop {
            let snapshot = self.connector.fetch_details(connector_id).await?;
            iterations += 1;

            let outcome = evaluate(snapshot.last_success, snapshot.last_failure, reference_time);
            log_outcome(&snapshot, outcome, reference_time);

            if outcome.is_terminal() || !options.blocking {
                return Ok(outcome);
            }

            info!(
                "connector={}; Not finished syncing, waiting {}s and trying again (check {})",
                connector_id,
                options.interval.as_secs(),
                iterations
            );

            match self.wait(options.interval, deadline_at).await {
                Wait::Elapsed => continue,
                Wait::Cancelled => return Err(PollError::Cancelled { iterations }),
                Wait::DeadlineReached => {
                    return Err(PollError::DeadlineExceeded {
                        deadline: options.deadline.unwrap_or_default(),
                        iterations,
                    });
                }
            }
        }
    }

    async fn wait(&self, interval: Duration, deadline_at: Option<Instant>) -> Wait {
        let deadline = async {
            match deadline_at {
                Some(at) => sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Wait::Cancelled,
            _ = deadline => Wait::DeadlineReached,
            _ = sleep(interval) => Wait::Elapsed,
        }
    }
}

fn log_outcome(
    snapshot: &ConnectorSnapshot,
    outcome: SyncOutcome,
    reference_time: Option<DateTime<Utc>>,
) {
    let id = &snapshot.connector_id;
    match outcome {
        SyncOutcome::Failed => info!(
            "connector={}; Connector recently errored at {:?}",
            id, snapshot.last_failure
        ),
        SyncOutcome::Succeeded => info!(
            "connector={}; Connector was recently successful at {:?}",
            id, snapshot.last_success
        ),
        SyncOutcome::Pending => match reference_time {
            Some(reference) => info!(
                "connector={}; Connector has not completed since the execution time of {}",
                id, reference
            ),
            None => debug!("connector={}; Pending without reference time", id),
        },
    }
}
