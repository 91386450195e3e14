//! Block toggle de-duplication through the full request path.

mod support;

use std::time::Duration;

use serde_json::json;
use snapi_infra::{ApiCommands, RequestOptions};
use support::{authed_store, hydrated_client, requests_to};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BLOCK: &str = "/app/api/block";

async fn block_server(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(BLOCK))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})).set_delay(delay))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn repeated_block_is_debounced() {
    let server = block_server(Duration::ZERO).await;
    let client = hydrated_client(&server, authed_store("a", "r")).await;
    let options = || RequestOptions::post().json(json!({"from": "+15551234567", "blocked": true}));

    let first = client.request(BLOCK, options()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = client.request(BLOCK, options()).await.unwrap();

    assert_eq!(first, json!({"ok": true}));
    assert_eq!(second, json!({"ok": true, "debounced": true, "from": "+15551234567", "blocked": true}));
    assert_eq!(requests_to(&server, BLOCK).await, 1);
}

#[tokio::test]
async fn reversal_goes_through() {
    let server = block_server(Duration::ZERO).await;
    let commands = ApiCommands::new(hydrated_client(&server, authed_store("a", "r")).await);

    let block = commands.set_blocked("+15551234567", true).await.unwrap();
    let unblock = commands.set_blocked("+15551234567", false).await.unwrap();

    assert!(!block.debounced);
    assert!(!unblock.debounced);
    assert_eq!(requests_to(&server, BLOCK).await, 2);
}

#[tokio::test]
async fn double_tap_while_in_flight_sends_once() {
    let server = block_server(Duration::from_millis(100)).await;
    let commands = ApiCommands::new(hydrated_client(&server, authed_store("a", "r")).await);

    let (a, b) = tokio::join!(
        commands.set_blocked("+15550000001", true),
        commands.set_blocked("+15550000001", true),
    );

    assert!(a.unwrap().ok == Some(true));
    assert!(b.unwrap().debounced);
    assert_eq!(requests_to(&server, BLOCK).await, 1);
}

#[tokio::test]
async fn different_resources_are_independent() {
    let server = block_server(Duration::ZERO).await;
    let commands = ApiCommands::new(hydrated_client(&server, authed_store("a", "r")).await);

    commands.set_blocked("+15550000001", true).await.unwrap();
    commands.set_blocked("+15550000002", true).await.unwrap();

    assert_eq!(requests_to(&server, BLOCK).await, 2);
}

#[tokio::test]
async fn form_encoded_toggle_is_debounced_too() {
    let server = block_server(Duration::ZERO).await;
    let client = hydrated_client(&server, authed_store("a", "r")).await;
    let options = || RequestOptions::post().form([("from", "+15551234567"), ("blocked", "1")]);

    client.request(BLOCK, options()).await.unwrap();
    let second = client.request(BLOCK, options()).await.unwrap();

    assert_eq!(second["debounced"], json!(true));
    assert_eq!(requests_to(&server, BLOCK).await, 1);
}

#[tokio::test]
async fn failed_toggle_can_be_retried_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(BLOCK))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(BLOCK))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let commands = ApiCommands::new(hydrated_client(&server, authed_store("a", "r")).await);

    let err = commands.set_blocked("+15551234567", true).await.unwrap_err();
    assert_eq!(err.to_string(), "db down");

    let ack = commands.set_blocked("+15551234567", true).await.unwrap();
    assert!(!ack.debounced);
    assert_eq!(requests_to(&server, BLOCK).await, 2);
}
