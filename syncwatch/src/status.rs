use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exit code reported for a sync that has not finished since the reference time.
pub const EXIT_CODE_PENDING: i32 = 255;
pub const EXIT_CODE_SUCCEEDED: i32 = 0;
pub const EXIT_CODE_FAILED: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    Succeeded,
    Failed,
    Pending,
}

impl SyncOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SyncOutcome::Pending)
    }

    pub fn exit_code(self) -> i32 {
        match self {
            SyncOutcome::Succeeded => EXIT_CODE_SUCCEEDED,
            SyncOutcome::Failed => EXIT_CODE_FAILED,
            SyncOutcome::Pending => EXIT_CODE_PENDING,
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Succeeded => write!(f, "succeeded"),
            SyncOutcome::Failed => write!(f, "failed"),
            SyncOutcome::Pending => write!(f, "pending"),
        }
    }
}

/// Stand-in for a timestamp the connector never reported.
///
/// Earlier than anything the upstream service can return, so an absent
/// value never wins a comparison against a real one.
pub fn never() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

/// Classify a connector's last success/failure against the instant a sync was triggered.
///
/// Without a reference time there is nothing to wait for, so the newer of the two
/// timestamps decides. With one, a sync only counts as finished once either timestamp
/// moves past it, and a failure past the reference always wins.
pub fn evaluate(
    last_success: Option<DateTime<Utc>>,
    last_failure: Option<DateTime<Utc>>,
    reference_time: Option<DateTime<Utc>>,
) -> SyncOutcome {
    let last_success = last_success.unwrap_or_else(never);
    let last_failure = last_failure.unwrap_or_else(never);

    match reference_time {
        Some(reference) => {
            if last_failure > reference {
                SyncOutcome::Failed
            } else if last_success > reference {
                SyncOutcome::Succeeded
            } else {
                SyncOutcome::Pending
            }
        }
        None => {
            if last_failure > last_success {
                SyncOutcome::Failed
            } else {
                SyncOutcome::Succeeded
            }
        }
    }
}
