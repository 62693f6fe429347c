mod helpers;

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use syncwatch::store::file_store::FileWatchStore;
    use syncwatch::store::{WatchKey, WatchStore};
    use wiremock::MockServer;

    use super::helpers::*;

    const CONNECTOR: &str = "decent_dropsy";

    #[tokio::test]
    async fn test_trigger_then_check_across_invocations() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_trigger(&server, CONNECTOR, "Success", "Sync has been successfully triggered").await;

        let before = Utc::now();
        let code = run_cli(
            &server,
            dir.path(),
            &["execute-sync", "--connector-id", CONNECTOR, "--check-status", "FALSE"],
        )
        .await;
        assert_eq!(code, 0);

        let store = FileWatchStore::new(dir.path().join("fivetran-blueprints/variables"));
        let watch = store.get(&WatchKey::default_key()).await.unwrap().unwrap();
        assert_eq!(watch.connector_id, CONNECTOR);
        let reference = watch.reference_time.unwrap();
        assert!(reference >= before);
        assert!(dir
            .path()
            .join(format!("fivetran-blueprints/responses/sync_{}_response.json", CONNECTOR))
            .exists());

        // Still running: last success predates the trigger.
        mount_details(
            &server,
            CONNECTOR,
            details_body(CONNECTOR, Some(reference - Duration::hours(1)), None),
            None,
        )
        .await;
        assert_eq!(run_cli(&server, dir.path(), &["check-status"]).await, 255);

        server.reset().await;
        mount_details(
            &server,
            CONNECTOR,
            details_body(CONNECTOR, Some(reference + Duration::minutes(5)), None),
            None,
        )
        .await;
        assert_eq!(run_cli(&server, dir.path(), &["check-status"]).await, 0);

        server.reset().await;
        mount_details(
            &server,
            CONNECTOR,
            details_body(
                CONNECTOR,
                Some(reference + Duration::minutes(6)),
                Some(reference + Duration::minutes(5)),
            ),
            None,
        )
        .await;
        assert_eq!(run_cli(&server, dir.path(), &["check-status"]).await, 1);
    }

    #[tokio::test]
    async fn test_check_status_without_prior_trigger_fails() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(run_cli(&server, dir.path(), &["check-status"]).await, 1);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_status_with_explicit_connector() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_details(
            &server,
            CONNECTOR,
            details_body(CONNECTOR, Some(Utc::now() - Duration::days(2)), None),
            None,
        )
        .await;

        let code = run_cli(
            &server,
            dir.path(),
            &["check-status", "--connector-id", CONNECTOR],
        )
        .await;
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_rejected_trigger_stores_nothing() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_trigger(&server, CONNECTOR, "NotFound_Connector", "Connector not found").await;

        let code = run_cli(&server, dir.path(), &["execute-sync", "--connector-id", CONNECTOR]).await;
        assert_eq!(code, 1);

        let store = FileWatchStore::new(dir.path().join("fivetran-blueprints/variables"));
        assert_eq!(store.get(&WatchKey::default_key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_accepted_trigger_is_stored_when_responses_dir_is_unwritable() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_trigger(&server, CONNECTOR, "Success", "ok").await;
        std::fs::create_dir_all(dir.path().join("fivetran-blueprints")).unwrap();
        std::fs::write(dir.path().join("fivetran-blueprints/responses"), b"").unwrap();

        let code = run_cli(
            &server,
            dir.path(),
            &["execute-sync", "--connector-id", CONNECTOR, "--check-status", "FALSE"],
        )
        .await;
        assert_eq!(code, 0);

        let store = FileWatchStore::new(dir.path().join("fivetran-blueprints/variables"));
        let watch = store.get(&WatchKey::default_key()).await.unwrap().unwrap();
        assert_eq!(watch.connector_id, CONNECTOR);
        assert!(watch.reference_time.is_some());
    }

    #[tokio::test]
    async fn test_correlation_ids_track_connectors_separately() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_trigger(&server, "conn_a", "Success", "ok").await;
        mount_trigger(&server, "conn_b", "Success", "ok").await;

        for (connector, run_id) in [("conn_a", "run-a"), ("conn_b", "run-b")] {
            let code = run_cli(
                &server,
                dir.path(),
                &[
                    "execute-sync",
                    "--connector-id",
                    connector,
                    "--check-status",
                    "FALSE",
                    "--correlation-id",
                    run_id,
                ],
            )
            .await;
            assert_eq!(code, 0);
        }

        let store = FileWatchStore::new(dir.path().join("fivetran-blueprints/variables"));
        let a = store.get(&WatchKey::derive(Some("run-a"))).await.unwrap().unwrap();
        let b = store.get(&WatchKey::derive(Some("run-b"))).await.unwrap().unwrap();
        assert_eq!(a.connector_id, "conn_a");
        assert_eq!(b.connector_id, "conn_b");
        assert_eq!(store.get(&WatchKey::default_key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_execute_sync_waits_for_completion() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_trigger(&server, CONNECTOR, "Success", "ok").await;
        // Two pending answers, then a success far enough ahead to beat the trigger time.
        mount_details(
            &server,
            CONNECTOR,
            details_body(CONNECTOR, Some(Utc::now() - Duration::hours(1)), None),
            Some(2),
        )
        .await;
        mount_details(
            &server,
            CONNECTOR,
            details_body(CONNECTOR, Some(Utc::now() + Duration::hours(1)), None),
            None,
        )
        .await;

        let code = run_cli(
            &server,
            dir.path(),
            &["execute-sync", "--connector-id", CONNECTOR, "--poll-interval-secs", "1"],
        )
        .await;
        assert_eq!(code, 0);

        let details_requests = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == "GET")
            .count();
        assert_eq!(details_requests, 3);
    }

    #[tokio::test]
    async fn test_check_status_wait_resolves_stored_watch() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_trigger(&server, CONNECTOR, "Success", "ok").await;
        let code = run_cli(
            &server,
            dir.path(),
            &["execute-sync", "--connector-id", CONNECTOR, "--check-status", "FALSE"],
        )
        .await;
        assert_eq!(code, 0);

        let store = FileWatchStore::new(dir.path().join("fivetran-blueprints/variables"));
        let reference = store
            .get(&WatchKey::default_key())
            .await
            .unwrap()
            .unwrap()
            .reference_time
            .unwrap();
        mount_details(
            &server,
            CONNECTOR,
            details_body(CONNECTOR, Some(reference - Duration::hours(1)), None),
            Some(1),
        )
        .await;
        mount_details(
            &server,
            CONNECTOR,
            details_body(
                CONNECTOR,
                Some(reference - Duration::hours(1)),
                Some(reference + Duration::minutes(2)),
            ),
            None,
        )
        .await;

        let code = run_cli(
            &server,
            dir.path(),
            &["check-status", "--wait", "--poll-interval-secs", "1"],
        )
        .await;
        assert_eq!(code, 1);

        let details_requests = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == "GET")
            .count();
        assert_eq!(details_requests, 2);
    }

    #[tokio::test]
    async fn test_malformed_timestamp_fails_closed() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_details(
            &server,
            CONNECTOR,
            serde_json::json!({
                "code": "Success",
                "data": {"id": CONNECTOR, "succeeded_at": "not-a-date", "failed_at": null}
            }),
            None,
        )
        .await;

        let code = run_cli(
            &server,
            dir.path(),
            &["check-status", "--connector-id", CONNECTOR],
        )
        .await;
        assert_eq!(code, 1);
    }
}
