pub mod fivetran;
#[cfg(test)]
pub(crate) mod scripted;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Envelope code the upstream API uses for a successful call.
pub const SUCCESS_CODE: &str = "Success";

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Upstream rejected request ({code}): {message}")]
    UpstreamRejected { code: String, message: String },
    #[error("Invalid {field} timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Error sending request: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Connector state as reported by one fetch. Never reused across polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorSnapshot {
    pub connector_id: String,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub status_code: String,
    pub status_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerReceipt {
    pub accepted: bool,
    pub status_code: String,
    pub message: Option<String>,
}

/// Seam to the connector-management API. Each call is exactly one round trip.
#[async_trait::async_trait]
pub trait ConnectorApi: Send + Sync {
    async fn fetch_details(&self, connector_id: &str) -> Result<ConnectorSnapshot, ConnectorError>;

    async fn trigger_sync(&self, connector_id: &str) -> Result<TriggerReceipt, ConnectorError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

fn parse_envelope(body: &Value) -> Result<Envelope, ConnectorError> {
    Envelope::deserialize(body)
        .map_err(|e| ConnectorError::MalformedResponse(format!("bad envelope: {}", e)))
}

/// Null, missing and empty timestamps mean "never happened"; anything else must parse.
fn parse_timestamp(
    data: &Value,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, ConnectorError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| ConnectorError::InvalidTimestamp {
                field,
                value: s.clone(),
                reason: e.to_string(),
            }),
        Some(other) => Err(ConnectorError::InvalidTimestamp {
            field,
            value: other.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

/// Normalize a connector-details response body.
///
/// A non-success envelope is returned as [`ConnectorError::UpstreamRejected`] with the
/// upstream message untouched.
pub fn snapshot_from_response(
    requested_id: &str,
    body: &Value,
) -> Result<ConnectorSnapshot, ConnectorError> {
    let envelope = parse_envelope(body)?;
    if envelope.code != SUCCESS_CODE {
        return Err(ConnectorError::UpstreamRejected {
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
        });
    }

    let data = envelope
        .data
        .ok_or_else(|| ConnectorError::MalformedResponse("missing data object".to_string()))?;

    let connector_id = data
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(requested_id)
        .to_string();

    Ok(ConnectorSnapshot {
        connector_id,
        last_success: parse_timestamp(&data, "succeeded_at")?,
        last_failure: parse_timestamp(&data, "failed_at")?,
        status_code: envelope.code,
        status_message: envelope.message,
    })
}

pub fn receipt_from_response(body: &Value) -> Result<TriggerReceipt, ConnectorError> {
    let envelope = parse_envelope(body)?;
    Ok(TriggerReceipt {
        accepted: envelope.code == SUCCESS_CODE,
        status_code: envelope.code,
        message: envelope.message,
    })
}
