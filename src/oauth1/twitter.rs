// ABOUTME: Twitter/X OAuth 1.0a connector for the three-legged handshake
// ABOUTME: Signed request-token, access-token, and identity calls with bounded timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{authorization_header, ConsumerCredentials};
use crate::connectors::ServiceConnector;
use crate::constants::oauth_config::PROVIDER_TIMEOUT_SECS;
use crate::constants::twitter::{
    ACCESS_TOKEN_PATH, AUTHORIZE_PATH, DEFAULT_BASE_URL, REQUEST_TOKEN_PATH,
    VERIFY_CREDENTIALS_PATH,
};
use crate::errors::{AppError, AppResult};
use crate::models::{AccessToken, RequestToken, ServiceIdentity, ServiceType};

/// Twitter connector configuration
#[derive(Debug, Clone)]
pub struct TwitterConnectorConfig {
    /// Application consumer key
    pub consumer_key: String,
    /// Application consumer secret
    pub consumer_secret: String,
    /// API base URL (overridable for testing)
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl TwitterConnectorConfig {
    /// Config with default endpoint and timeout
    #[must_use]
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: PROVIDER_TIMEOUT_SECS,
        }
    }
}

/// OAuth 1.0a connector for Twitter/X
pub struct TwitterConnector {
    config: TwitterConnectorConfig,
    consumer: ConsumerCredentials,
    client: Client,
}

#[derive(Deserialize)]
struct VerifyCredentialsResponse {
    id_str: String,
    screen_name: String,
}

impl TwitterConnector {
    /// Build a connector with a bounded-timeout HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: TwitterConnectorConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        let consumer = ConsumerCredentials {
            key: config.consumer_key.clone(),
            secret: config.consumer_secret.clone(),
        };

        Ok(Self {
            config,
            consumer,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Parse a form-encoded token response body into a key/value map
    fn parse_form_body(body: &str) -> HashMap<String, String> {
        url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect()
    }

    async fn post_signed(
        &self,
        url: &str,
        token: Option<(&str, &str)>,
        extra_oauth: &[(&str, &str)],
    ) -> AppResult<String> {
        let header = authorization_header("POST", url, &self.consumer, token, extra_oauth, &[]);

        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, header)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("Provider request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::provider(format!("Failed to read provider response: {e}")))?;

        if !status.is_success() {
            return Err(AppError::provider_auth(format!(
                "Provider rejected request ({status}): {body}"
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl ServiceConnector for TwitterConnector {
    fn service(&self) -> ServiceType {
        ServiceType::Twitter
    }

    async fn request_token(&self, callback_url: &str) -> AppResult<RequestToken> {
        let url = self.endpoint(REQUEST_TOKEN_PATH);
        let body = self
            .post_signed(&url, None, &[("oauth_callback", callback_url)])
            .await
            .map_err(|e| AppError::provider(format!("Request token step failed: {}", e.message)))?;

        let fields = Self::parse_form_body(&body);
        let token = fields.get("oauth_token").ok_or_else(|| {
            AppError::provider("Malformed request token response: missing oauth_token")
        })?;
        let secret = fields.get("oauth_token_secret").ok_or_else(|| {
            AppError::provider("Malformed request token response: missing oauth_token_secret")
        })?;
        let callback_confirmed = fields
            .get("oauth_callback_confirmed")
            .is_some_and(|v| v == "true");

        debug!(token = %token, callback_confirmed, "Obtained request token");

        Ok(RequestToken {
            token: token.clone(),
            secret: secret.clone(),
            callback_confirmed,
        })
    }

    fn authorization_url(&self, request_token: &str) -> String {
        format!(
            "{}{}?oauth_token={}",
            self.config.base_url,
            AUTHORIZE_PATH,
            urlencoding::encode(request_token)
        )
    }

    async fn exchange_token(
        &self,
        request_token: &str,
        token_secret: &str,
        verifier: &str,
    ) -> AppResult<AccessToken> {
        let url = self.endpoint(ACCESS_TOKEN_PATH);
        let body = self
            .post_signed(
                &url,
                Some((request_token, token_secret)),
                &[("oauth_verifier", verifier)],
            )
            .await?;

        let fields = Self::parse_form_body(&body);
        let token = fields.get("oauth_token").ok_or_else(|| {
            AppError::provider_auth("Malformed access token response: missing oauth_token")
        })?;
        let secret = fields.get("oauth_token_secret").ok_or_else(|| {
            AppError::provider_auth("Malformed access token response: missing oauth_token_secret")
        })?;

        Ok(AccessToken {
            token: token.clone(),
            secret: secret.clone(),
            user_id: fields.get("user_id").cloned(),
            screen_name: fields.get("screen_name").cloned(),
        })
    }

    async fn fetch_identity(
        &self,
        access_token: &str,
        access_token_secret: &str,
    ) -> AppResult<ServiceIdentity> {
        let url = self.endpoint(VERIFY_CREDENTIALS_PATH);
        let header = authorization_header(
            "GET",
            &url,
            &self.consumer,
            Some((access_token, access_token_secret)),
            &[],
            &[],
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, header)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("Identity request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::provider_auth(format!(
                "Provider refused identity check ({})",
                response.status()
            )));
        }

        let identity: VerifyCredentialsResponse = response.json().await.map_err(|e| {
            AppError::provider(format!("Malformed identity response: {e}"))
        })?;

        Ok(ServiceIdentity {
            user_id: identity.id_str,
            username: identity.screen_name,
        })
    }
}
