// ABOUTME: Shared test infrastructure: in-memory databases and a mock service connector
// ABOUTME: The mock connector exercises the handshake engine without network access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tether::broker::ConnectionBroker;
use tether::cache::SessionCache;
use tether::connectors::{ConnectorRegistry, ServiceConnector};
use tether::crypto::SecretCipher;
use tether::database::Database;
use tether::errors::{AppError, AppResult};
use tether::models::{AccessToken, RequestToken, ServiceIdentity, ServiceType};

/// A valid 32+ character encryption key for tests
pub const TEST_ENCRYPTION_KEY: &str = "test-encryption-key-0123456789abcdef";

/// Base URL the mock connector pretends to be
pub const MOCK_PROVIDER_URL: &str = "https://provider.test";

/// In-memory database with real encryption enabled
pub async fn test_database() -> Database {
    Database::new("sqlite::memory:", SecretCipher::new(Some(TEST_ENCRYPTION_KEY)))
        .await
        .expect("Failed to create test database")
}

/// Connector double with switchable failure modes
pub struct MockConnector {
    pub service: ServiceType,
    pub fail_request_token: bool,
    pub fail_exchange: bool,
    pub fail_identity: bool,
    pub identity_calls: AtomicUsize,
}

impl MockConnector {
    pub fn new(service: ServiceType) -> Self {
        Self {
            service,
            fail_request_token: false,
            fail_exchange: false,
            fail_identity: false,
            identity_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ServiceConnector for MockConnector {
    fn service(&self) -> ServiceType {
        self.service
    }

    async fn request_token(&self, _callback_url: &str) -> AppResult<RequestToken> {
        if self.fail_request_token {
            return Err(AppError::provider("mock request token failure"));
        }
        Ok(RequestToken {
            token: "mock-request-token".to_owned(),
            secret: "mock-request-secret".to_owned(),
            callback_confirmed: true,
        })
    }

    fn authorization_url(&self, request_token: &str) -> String {
        format!("{MOCK_PROVIDER_URL}/oauth/authorize?oauth_token={request_token}")
    }

    async fn exchange_token(
        &self,
        _request_token: &str,
        token_secret: &str,
        verifier: &str,
    ) -> AppResult<AccessToken> {
        if self.fail_exchange {
            return Err(AppError::provider_auth("mock exchange refusal"));
        }
        assert_eq!(token_secret, "mock-request-secret");
        assert_eq!(verifier, "mock-verifier");
        Ok(AccessToken {
            token: "mock-access-token".to_owned(),
            secret: "mock-access-secret".to_owned(),
            user_id: Some("12345".to_owned()),
            screen_name: Some("alice".to_owned()),
        })
    }

    async fn fetch_identity(
        &self,
        _access_token: &str,
        _access_token_secret: &str,
    ) -> AppResult<ServiceIdentity> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_identity {
            return Err(AppError::provider_auth("mock identity refusal"));
        }
        Ok(ServiceIdentity {
            user_id: "12345".to_owned(),
            username: "alice".to_owned(),
        })
    }
}

/// Broker wired to an in-memory database and the given mock connector
pub async fn test_broker(
    connector: MockConnector,
) -> (Arc<ConnectionBroker>, Arc<MockConnector>, Arc<Database>) {
    let database = Arc::new(test_database().await);
    let connector = Arc::new(connector);
    let mut registry = ConnectorRegistry::new();
    registry.register(connector.clone());
    let broker = ConnectionBroker::new(
        database.clone(),
        Arc::new(SessionCache::new()),
        registry,
        "http://localhost:8080",
    );
    (Arc::new(broker), connector, database)
}
