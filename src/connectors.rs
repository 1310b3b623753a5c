// ABOUTME: ServiceConnector capability trait and the per-service dispatch registry
// ABOUTME: Adding a provider means registering a connector, not editing the handshake engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::models::{AccessToken, RequestToken, ServiceIdentity, ServiceType};

/// Capability set a service integration must provide for the OAuth 1.0a
/// handshake and connection testing.
#[async_trait]
pub trait ServiceConnector: Send + Sync {
    /// Service this connector handles
    fn service(&self) -> ServiceType;

    /// Step 1: obtain an unauthorized request token from the provider.
    /// Not retried here; request tokens are single-use and retry semantics
    /// belong to the caller.
    async fn request_token(&self, callback_url: &str) -> AppResult<RequestToken>;

    /// User-facing authorization URL for a request token
    fn authorization_url(&self, request_token: &str) -> String;

    /// Step 3: exchange the verifier for a permanent access token
    async fn exchange_token(
        &self,
        request_token: &str,
        token_secret: &str,
        verifier: &str,
    ) -> AppResult<AccessToken>;

    /// Fetch the authenticated user's identity with an access token pair
    async fn fetch_identity(
        &self,
        access_token: &str,
        access_token_secret: &str,
    ) -> AppResult<ServiceIdentity>;
}

/// Dispatch table from service name to connector implementation
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<ServiceType, Arc<dyn ServiceConnector>>,
}

impl ConnectorRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its own service name, replacing any
    /// previous registration for that service
    pub fn register(&mut self, connector: Arc<dyn ServiceConnector>) {
        self.connectors.insert(connector.service(), connector);
    }

    /// Look up the connector for a service.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` when no connector is configured for
    /// the service; the initiate path is disabled rather than crashing.
    pub fn get(&self, service: ServiceType) -> AppResult<Arc<dyn ServiceConnector>> {
        self.connectors.get(&service).cloned().ok_or_else(|| {
            AppError::config(format!(
                "No connector configured for service '{service}'; check provider credentials"
            ))
        })
    }

    /// Whether a connector is registered for the service
    #[must_use]
    pub fn is_supported(&self, service: ServiceType) -> bool {
        self.connectors.contains_key(&service)
    }

    /// Services with a registered connector
    #[must_use]
    pub fn supported_services(&self) -> Vec<ServiceType> {
        self.connectors.keys().copied().collect()
    }
}
