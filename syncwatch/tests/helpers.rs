use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use syncwatch::cli::syncwatch_cli;
use syncwatch::commands;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn details_body(
    connector_id: &str,
    succeeded_at: Option<DateTime<Utc>>,
    failed_at: Option<DateTime<Utc>>,
) -> Value {
    json!({
        "code": "Success",
        "data": {
            "id": connector_id,
            "succeeded_at": succeeded_at.map(|t| t.to_rfc3339()),
            "failed_at": failed_at.map(|t| t.to_rfc3339()),
        }
    })
}

pub async fn mount_trigger(server: &MockServer, connector_id: &str, code: &str, message: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/connectors/{}/force", connector_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": code,
            "message": message,
        })))
        .mount(server)
        .await;
}

pub async fn mount_details(server: &MockServer, connector_id: &str, body: Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/v1/connectors/{}/", connector_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Run one command line the way the binary would, as if in a fresh process.
pub async fn run_cli(server: &MockServer, artifacts_dir: &Path, args: &[&str]) -> i32 {
    let uri = server.uri();
    let dir = artifacts_dir.display().to_string();
    let mut argv: Vec<&str> = vec!["syncwatch"];
    argv.extend_from_slice(args);
    argv.extend_from_slice(&[
        "--api-key",
        "test-key",
        "--api-secret",
        "test-secret",
        "--api-base",
        &uri,
        "--artifacts-dir",
        &dir,
    ]);

    let matches = syncwatch_cli()
        .try_get_matches_from(argv)
        .expect("valid command line");
    commands::run(&matches, CancellationToken::new()).await
}
