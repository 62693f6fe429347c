use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::artifacts::{ArtifactRecorder, connector_response_name, sync_response_name};
use crate::connector::{
    ConnectorApi, ConnectorError, ConnectorSnapshot, TriggerReceipt, receipt_from_response,
    snapshot_from_response,
};

pub const DEFAULT_API_BASE: &str = "https://api.fivetran.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

/// Connector API over HTTP with basic auth. Every response body is handed to the
/// artifact recorder before it is interpreted; a recorder failure is only logged.
pub struct FivetranClient {
    client: Client,
    api_base: String,
    credentials: Credentials,
    recorder: Arc<dyn ArtifactRecorder>,
}

impl FivetranClient {
    pub fn new(
        api_base: impl Into<String>,
        credentials: Credentials,
        recorder: Arc<dyn ArtifactRecorder>,
    ) -> Result<Self, ConnectorError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(FivetranClient {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
            recorder,
        })
    }

    fn connector_url(&self, connector_id: &str) -> String {
        format!("{}/v1/connectors/{}", self.api_base, connector_id)
    }

    async fn send(&self, method: Method, url: String) -> Result<Value, ConnectorError> {
        debug!("Sending request: {} {}", &method, &url);
        let resp = self
            .client
            .request(method, &url)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .send()
            .await?;

        let http_status = resp.status();
        let bytes = resp.bytes().await?;
        serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            ConnectorError::MalformedResponse(format!(
                "HTTP {} from {}, body is not JSON: {}",
                http_status, url, e
            ))
        })
    }

    async fn record_response(&self, name: &str, body: &Value) {
        if let Err(e) = self.recorder.record(name, body).await {
            warn!("artifact={}; Could not record response: {}", name, e);
        }
    }
}

#[async_trait::async_trait]
impl ConnectorApi for FivetranClient {
    async fn fetch_details(&self, connector_id: &str) -> Result<ConnectorSnapshot, ConnectorError> {
        info!("connector={}; Grabbing connector details", connector_id);
        let url = format!("{}/", self.connector_url(connector_id));
        let body = self.send(Method::GET, url).await?;
        self.record_response(&connector_response_name(connector_id), &body)
            .await;
        snapshot_from_response(connector_id, &body)
    }

    async fn trigger_sync(&self, connector_id: &str) -> Result<TriggerReceipt, ConnectorError> {
        info!("connector={}; Starting to sync connector", connector_id);
        let url = format!("{}/force", self.connector_url(connector_id));
        let body = self.send(Method::POST, url).await?;
        self.record_response(&sync_response_name(connector_id), &body)
            .await;
        receipt_from_response(&body)
    }
}
