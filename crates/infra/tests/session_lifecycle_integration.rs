//! Session hydrate / set / clear behaviour through the client surface.

mod support;

use std::sync::Arc;

use snapi_common::testing::FlakySecureStore;
use snapi_common::SecureStore;
use snapi_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use snapi_domain::SessionState;
use support::{authed_store, client_with, config_for, seeded_store};
use wiremock::MockServer;

#[tokio::test]
async fn fresh_install_hydrates_signed_out() {
    let server = MockServer::start().await;
    let client = client_with(config_for(&server), seeded_store());

    let state = client.hydrate().await;

    assert_eq!(state, SessionState { hydrated: true, is_authed: false, access_token: None });
}

#[tokio::test]
async fn stored_tokens_hydrate_authed() {
    let server = MockServer::start().await;
    let client = client_with(config_for(&server), authed_store("acc-1", "ref-1"));

    let state = client.hydrate().await;

    assert_eq!(
        state,
        SessionState { hydrated: true, is_authed: true, access_token: Some("acc-1".into()) }
    );
}

#[tokio::test]
async fn hydrate_twice_is_stable() {
    let server = MockServer::start().await;
    let client = client_with(config_for(&server), authed_store("acc-1", "ref-1"));

    let first = client.hydrate().await;
    let second = client.hydrate().await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn unreadable_store_hydrates_signed_out() {
    let server = MockServer::start().await;
    let store = Arc::new(FlakySecureStore::new());
    store.inner().set(ACCESS_TOKEN_KEY, "acc").await.unwrap();
    store.inner().set(REFRESH_TOKEN_KEY, "ref").await.unwrap();
    store.fail_reads(true);

    let client = client_with(config_for(&server), store);

    assert_eq!(client.hydrate().await, SessionState::signed_out());
}

#[tokio::test]
async fn every_mutation_is_visible_immediately() {
    let server = MockServer::start().await;
    let store = seeded_store();
    let client = client_with(config_for(&server), store.clone());
    client.hydrate().await;

    let steps: [(Option<(&str, &str)>, SessionState); 4] = [
        (Some(("a1", "r1")), SessionState { hydrated: true, is_authed: true, access_token: Some("a1".into()) }),
        (None, SessionState::signed_out()),
        (Some(("a2", "r2")), SessionState { hydrated: true, is_authed: true, access_token: Some("a2".into()) }),
        (Some(("a3", "")), SessionState { hydrated: true, is_authed: false, access_token: Some("a3".into()) }),
    ];

    for (tokens, expected) in steps {
        match tokens {
            Some((access, refresh)) => client.set_tokens(access, refresh).await,
            None => client.clear_tokens().await,
        }
        assert_eq!(client.session(), expected);
    }

    client.clear_tokens().await;
    assert_eq!(store.peek(ACCESS_TOKEN_KEY), None);
    assert_eq!(store.peek(REFRESH_TOKEN_KEY), None);
}

#[tokio::test]
async fn sign_out_survives_keychain_failure() {
    let server = MockServer::start().await;
    let store = Arc::new(FlakySecureStore::new());
    let client = client_with(config_for(&server), store.clone());
    client.set_tokens("a", "r").await;

    store.fail_deletes(true);
    client.clear_tokens().await;

    assert_eq!(client.session(), SessionState::signed_out());
}

#[tokio::test]
async fn device_id_is_stable_and_persisted() {
    let server = MockServer::start().await;
    let store = Arc::new(snapi_common::MemorySecureStore::new());
    let client = client_with(config_for(&server), store.clone());

    let first = client.device_id().await;
    let second = client.device_id().await;

    assert_eq!(first, second);
    assert!(first.starts_with("snapi-"));
    assert_eq!(store.peek(snapi_domain::constants::DEVICE_ID_KEY), Some(first));
}
