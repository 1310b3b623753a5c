// ABOUTME: Tests for the connection status resolver and the disconnect/test operations
// ABOUTME: Status is fail-safe: infrastructure trouble reads as disconnected, never as an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{test_broker, MockConnector};
use tether::errors::ErrorCode;
use tether::models::{
    GenericCredentials, ServiceCredentials, ServiceType, TwitterCredentials,
};
use uuid::Uuid;

fn stored_twitter_credentials() -> ServiceCredentials {
    ServiceCredentials::Twitter(TwitterCredentials {
        api_key: None,
        api_secret_key: None,
        access_token: "stored-token".to_owned(),
        access_token_secret: "stored-secret".to_owned(),
        user_id: Some("12345".to_owned()),
        username: Some("alice".to_owned()),
    })
}

#[tokio::test]
async fn connected_status_carries_the_stored_identity() {
    let (broker, _, db) = test_broker(MockConnector::new(ServiceType::Twitter)).await;
    let agent_id = Uuid::new_v4();

    db.store_service_credentials(agent_id, &stored_twitter_credentials())
        .await
        .expect("store failed");

    let status = broker
        .get_connection_status(agent_id, ServiceType::Twitter)
        .await;
    assert!(status.is_connected);
    assert_eq!(status.service_name, ServiceType::Twitter);
    assert_eq!(status.username.as_deref(), Some("alice"));
    assert_eq!(status.user_id.as_deref(), Some("12345"));
}

#[tokio::test]
async fn no_stored_credentials_reads_as_disconnected() {
    let (broker, _, _) = test_broker(MockConnector::new(ServiceType::Twitter)).await;

    let status = broker
        .get_connection_status(Uuid::new_v4(), ServiceType::Twitter)
        .await;
    assert!(!status.is_connected);
    assert!(status.username.is_none());
    assert!(status.user_id.is_none());
}

#[tokio::test]
async fn disconnect_flips_status_to_disconnected() {
    let (broker, _, db) = test_broker(MockConnector::new(ServiceType::Twitter)).await;
    let agent_id = Uuid::new_v4();

    db.store_service_credentials(agent_id, &stored_twitter_credentials())
        .await
        .expect("store failed");
    assert!(
        broker
            .get_connection_status(agent_id, ServiceType::Twitter)
            .await
            .is_connected
    );

    broker
        .disconnect(agent_id, ServiceType::Twitter)
        .await
        .expect("disconnect failed");

    let status = broker
        .get_connection_status(agent_id, ServiceType::Twitter)
        .await;
    assert!(!status.is_connected);
}

#[tokio::test]
async fn unreachable_store_degrades_to_disconnected() {
    let (broker, _, db) = test_broker(MockConnector::new(ServiceType::Twitter)).await;
    let agent_id = Uuid::new_v4();

    db.store_service_credentials(agent_id, &stored_twitter_credentials())
        .await
        .expect("store failed");

    db.pool().close().await;

    // Status never errors, and never claims connected on ambiguous state
    let status = broker
        .get_connection_status(agent_id, ServiceType::Twitter)
        .await;
    assert!(!status.is_connected);
    assert!(status.username.is_none());
}

#[tokio::test]
async fn disconnect_against_an_unreachable_store_is_an_error() {
    let (broker, _, db) = test_broker(MockConnector::new(ServiceType::Twitter)).await;
    db.pool().close().await;

    // A failed revoke must not masquerade as a successful disconnect
    let err = broker
        .disconnect(Uuid::new_v4(), ServiceType::Twitter)
        .await
        .expect_err("disconnect must surface store failure");
    assert_eq!(err.code, ErrorCode::StoreUnavailable);
}

#[tokio::test]
async fn all_statuses_cover_every_service_independently() {
    let (broker, _, db) = test_broker(MockConnector::new(ServiceType::Twitter)).await;
    let agent_id = Uuid::new_v4();

    db.store_service_credentials(agent_id, &stored_twitter_credentials())
        .await
        .expect("store failed");
    db.store_service_credentials(
        agent_id,
        &ServiceCredentials::generic(
            ServiceType::Github,
            GenericCredentials {
                access_token: Some("gh-tok".to_owned()),
                username: Some("alice".to_owned()),
                user_id: None,
                extra: serde_json::Map::new(),
            },
        ),
    )
    .await
    .expect("store failed");

    let statuses = broker.get_all_connection_statuses(agent_id).await;
    assert_eq!(statuses.len(), ServiceType::ALL.len());

    for status in &statuses {
        let expected = matches!(
            status.service_name,
            ServiceType::Twitter | ServiceType::Github
        );
        assert_eq!(status.is_connected, expected, "{}", status.service_name);
    }
}

#[tokio::test]
async fn test_connection_verifies_against_the_provider() {
    let (broker, connector, db) = test_broker(MockConnector::new(ServiceType::Twitter)).await;
    let agent_id = Uuid::new_v4();

    db.store_service_credentials(agent_id, &stored_twitter_credentials())
        .await
        .expect("store failed");

    let outcome = broker.test_connection(agent_id, ServiceType::Twitter).await;
    assert!(outcome.success);
    assert_eq!(
        outcome.identity.expect("identity missing").username,
        "alice"
    );
    assert_eq!(
        connector
            .identity_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_connection_without_credentials_is_a_non_error_failure() {
    let (broker, _, _) = test_broker(MockConnector::new(ServiceType::Twitter)).await;

    let outcome = broker
        .test_connection(Uuid::new_v4(), ServiceType::Twitter)
        .await;
    assert!(!outcome.success);
    assert!(outcome.identity.is_none());
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn test_connection_reports_provider_refusal() {
    let connector = MockConnector {
        fail_identity: true,
        ..MockConnector::new(ServiceType::Twitter)
    };
    let (broker, _, db) = test_broker(connector).await;
    let agent_id = Uuid::new_v4();

    db.store_service_credentials(agent_id, &stored_twitter_credentials())
        .await
        .expect("store failed");

    let outcome = broker.test_connection(agent_id, ServiceType::Twitter).await;
    assert!(!outcome.success);
    assert!(outcome
        .error
        .as_deref()
        .is_some_and(|e| e.contains("refusal")));
}

#[tokio::test]
async fn test_connection_for_tokenless_credentials_is_unsupported() {
    let (broker, _, db) = test_broker(MockConnector::new(ServiceType::Twitter)).await;
    let agent_id = Uuid::new_v4();

    db.store_service_credentials(
        agent_id,
        &ServiceCredentials::generic(
            ServiceType::Github,
            GenericCredentials {
                access_token: Some("gh-tok".to_owned()),
                username: Some("alice".to_owned()),
                user_id: None,
                extra: serde_json::Map::new(),
            },
        ),
    )
    .await
    .expect("store failed");

    let outcome = broker.test_connection(agent_id, ServiceType::Github).await;
    assert!(!outcome.success);
    assert!(outcome
        .error
        .as_deref()
        .is_some_and(|e| e.contains("do not support")));
}
