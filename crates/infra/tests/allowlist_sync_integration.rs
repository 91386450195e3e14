//! Allowlist sync runs and the daily gate.

mod support;

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use snapi_common::SecureStore;
use snapi_domain::constants::{ALLOWLIST_LAST_SYNC_ATTEMPT_KEY, ALLOWLIST_LAST_SYNC_OK_KEY};
use snapi_infra::api::allowlist::{AllowlistConfig, AllowlistSync, SyncOutcome};
use support::{authed_store, hydrated_client, requests_to};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALLOW: &str = "/app/api/allow";

fn numbers(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn pushes_normalised_unique_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ALLOW))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let store = authed_store("a", "r");
    let sync = AllowlistSync::new(hydrated_client(&server, store.clone()).await);
    let outcome = sync
        .sync_now(&numbers(&["(555) 123-4567", "+1 555 123 4567", "5559876543", "bogus"]))
        .await;

    assert_eq!(outcome, SyncOutcome { ok: true, count: 2, error: None });
    assert_eq!(requests_to(&server, ALLOW).await, 2);
    assert!(store.peek(ALLOWLIST_LAST_SYNC_OK_KEY).is_some());
    assert!(store.peek(ALLOWLIST_LAST_SYNC_ATTEMPT_KEY).is_some());
}

#[tokio::test]
async fn respects_cap_and_concurrency_limits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ALLOW))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&server)
        .await;

    let config = AllowlistConfig { max_per_run: 5, concurrency: 2, ..AllowlistConfig::default() };
    let sync = AllowlistSync::with_config(hydrated_client(&server, authed_store("a", "r")).await, config);
    let raw: Vec<String> = (0..10).map(|i| format!("555000{i:04}")).collect();

    let outcome = sync.sync_now(&raw).await;

    assert_eq!(outcome.count, 5);
    assert_eq!(requests_to(&server, ALLOW).await, 5);
}

#[tokio::test]
async fn all_failures_report_first_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ALLOW))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "not allowed"})))
        .mount(&server)
        .await;

    let store = authed_store("a", "r");
    let sync = AllowlistSync::new(hydrated_client(&server, store.clone()).await);
    let outcome = sync.sync_now(&numbers(&["5551234567"])).await;

    assert_eq!(outcome, SyncOutcome { ok: false, count: 0, error: Some("not allowed".into()) });
    assert!(store.peek(ALLOWLIST_LAST_SYNC_OK_KEY).is_none());
    assert!(store.peek(ALLOWLIST_LAST_SYNC_ATTEMPT_KEY).is_some());
}

#[tokio::test]
async fn response_without_ok_counts_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ALLOW))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let sync = AllowlistSync::new(hydrated_client(&server, authed_store("a", "r")).await);
    let outcome = sync.sync_now(&numbers(&["5551234567"])).await;

    assert_eq!(outcome.error.as_deref(), Some("sync_failed"));
}

#[tokio::test]
async fn empty_input_is_a_successful_noop() {
    let server = MockServer::start().await;
    let sync = AllowlistSync::new(hydrated_client(&server, authed_store("a", "r")).await);

    let outcome = sync.sync_now(&numbers(&["12", ""])).await;

    assert_eq!(outcome, SyncOutcome { ok: true, count: 0, error: None });
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn daily_gate_skips_recent_runs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ALLOW))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let store = authed_store("a", "r");
    let sync = AllowlistSync::new(hydrated_client(&server, store.clone()).await);
    let list = numbers(&["5551234567"]);

    let first = sync.sync_if_needed(&list).await;
    assert!(first.did_run);
    assert_eq!(first.outcome.map(|o| o.count), Some(1));

    let second = sync.sync_if_needed(&list).await;
    assert!(!second.did_run);
    assert_eq!(requests_to(&server, ALLOW).await, 1);

    let stale = (Utc::now().timestamp_millis() - 25 * 60 * 60 * 1000).to_string();
    store.set(ALLOWLIST_LAST_SYNC_OK_KEY, &stale).await.unwrap();
    store.set(ALLOWLIST_LAST_SYNC_ATTEMPT_KEY, &stale).await.unwrap();

    let third = sync.sync_if_needed(&list).await;
    assert!(third.did_run);
    assert_eq!(requests_to(&server, ALLOW).await, 2);
}
