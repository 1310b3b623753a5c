// ABOUTME: OAuth handshake engine, connection status resolver, and broker facade
// ABOUTME: Orchestrates initiate/callback with race-safe single-use temp secrets and guaranteed cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use chrono::{Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::connectors::ConnectorRegistry;
use crate::constants::oauth_config::{SESSION_TTL_MINUTES, STATE_TOKEN_BYTES};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ConnectionStatus, GenericCredentials, OAuthSession, ServiceCredentials, ServiceIdentity,
    ServiceType, SessionStatus, TwitterCredentials,
};

/// Result of a successful initiate call.
///
/// The request-token secret is deliberately absent: it never leaves the
/// server.
#[derive(Debug, Clone, Serialize)]
pub struct InitiateConnectionResponse {
    /// Provider URL the user must visit to authorize the connection
    pub authorization_url: String,
    /// CSRF state token correlating this initiate with its callback
    pub state: String,
    /// Provider-issued request token
    pub request_token: String,
}

/// Parameters the provider redirect delivers to the callback
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    /// Request token issued at initiate time
    pub request_token: String,
    /// Provider-issued verifier proving user authorization
    pub verifier: String,
    /// State token from the initiate call
    pub state: String,
    /// Agent completing the handshake
    pub agent_id: Uuid,
}

/// Result of a completed handshake
#[derive(Debug, Clone, Serialize)]
pub struct CallbackOutcome {
    /// Always true; failures surface as errors
    pub success: bool,
    /// Service that was connected
    pub service: ServiceType,
    /// Authenticated identity from the provider
    pub identity: ServiceIdentity,
    /// Where the route layer should redirect the user, when set at initiate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

/// Result of an API connection test; never an error for the common
/// "no credentials" and "provider refused" cases
#[derive(Debug, Clone, Serialize)]
pub struct TestConnectionOutcome {
    /// Whether the stored credentials authenticated successfully
    pub success: bool,
    /// Identity confirmed by the provider, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ServiceIdentity>,
    /// Failure detail, on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestConnectionOutcome {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            identity: None,
            error: Some(error.into()),
        }
    }
}

/// Credential broker facade: handshake engine plus status resolver.
///
/// The session cache is injected rather than global, so a distributed cache
/// can replace it for horizontal scaling without touching handshake logic.
/// As built, sessions are process-local; scaling out without sticky
/// sessions breaks in-flight handshakes.
pub struct ConnectionBroker {
    database: Arc<Database>,
    cache: Arc<SessionCache>,
    connectors: ConnectorRegistry,
    callback_base_url: String,
}

impl ConnectionBroker {
    /// Assemble the broker from its collaborators
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        cache: Arc<SessionCache>,
        connectors: ConnectorRegistry,
        callback_base_url: impl Into<String>,
    ) -> Self {
        Self {
            database,
            cache,
            connectors,
            callback_base_url: callback_base_url.into(),
        }
    }

    /// Session cache handle, shared with callers that need direct inspection
    #[must_use]
    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Begin the OAuth handshake for (agent, service).
    ///
    /// Obtains a request token, stores the session and the request-token
    /// secret in the cache, and returns the authorization URL. The provider
    /// call is not retried; a failed initiate is simply restarted by the
    /// caller.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError` when no connector is configured for the service
    /// - `ProviderError` when the request-token call fails
    pub async fn initiate_connection(
        &self,
        agent_id: Uuid,
        service: ServiceType,
        return_url: Option<String>,
    ) -> AppResult<InitiateConnectionResponse> {
        let connector = self.connectors.get(service)?;

        let state = generate_state_token();
        let callback_url = format!(
            "{}/oauth/callback?state={}&agent_id={}",
            self.callback_base_url, state, agent_id
        );

        let request_token = connector.request_token(&callback_url).await?;
        if !request_token.callback_confirmed {
            warn!(%service, "Provider did not confirm the callback URL");
        }

        let now = Utc::now();
        let session = OAuthSession {
            state: state.clone(),
            agent_id,
            service,
            return_url,
            status: SessionStatus::Pending,
            created_at: now,
            expires_at: now + Duration::minutes(SESSION_TTL_MINUTES),
        };

        self.cache.put(
            &SessionCache::session_key(&state),
            serde_json::to_string(&session)?,
        );
        self.cache.put(
            &SessionCache::temp_secret_key(agent_id, service, &request_token.token),
            request_token.secret,
        );

        info!(%agent_id, %service, "OAuth handshake initiated");

        Ok(InitiateConnectionResponse {
            authorization_url: connector.authorization_url(&request_token.token),
            state,
            request_token: request_token.token,
        })
    }

    /// Complete the handshake when the provider redirects back.
    ///
    /// Validates the session (existence, expiry, owning agent), consumes the
    /// request-token secret exactly once, exchanges the verifier for a
    /// permanent access token, fetches the authenticated identity, and
    /// persists the credentials. Any failure removes the session and temp
    /// secret before surfacing, so no dangling state survives for a state
    /// token that will never be revisited. Replaying a completed callback
    /// deterministically fails.
    ///
    /// # Errors
    ///
    /// - `MalformedCallback` when any required parameter is empty
    /// - `InvalidOrExpiredSession` when the state is unknown, expired, or
    ///   owned by another agent
    /// - `MissingTempCredentials` when the request-token secret is gone
    /// - `ProviderAuthError` / `ProviderError` when the provider refuses
    /// - `StoreUnavailable` when persisting the final credentials fails
    pub async fn handle_callback(&self, params: CallbackParams) -> AppResult<CallbackOutcome> {
        if params.request_token.is_empty() || params.verifier.is_empty() || params.state.is_empty()
        {
            return Err(AppError::malformed_callback(
                "Callback requires request_token, verifier, state, and agent_id",
            ));
        }

        let session_key = SessionCache::session_key(&params.state);
        let session_json = self
            .cache
            .get(&session_key)
            .ok_or_else(|| AppError::invalid_session("Unknown or expired OAuth session"))?;
        let session: OAuthSession = serde_json::from_str(&session_json).map_err(|e| {
            self.cache.delete(&session_key);
            AppError::internal(format!("Corrupt session record: {e}"))
        })?;

        let temp_key =
            SessionCache::temp_secret_key(session.agent_id, session.service, &params.request_token);

        if session.is_expired() {
            self.cache.delete(&session_key);
            self.cache.delete(&temp_key);
            return Err(AppError::invalid_session("OAuth session has expired"));
        }

        if session.agent_id != params.agent_id {
            // Do not delete the session: the rightful owner may still complete it
            warn!(%params.agent_id, "Callback agent does not match session owner");
            return Err(AppError::invalid_session(
                "OAuth session does not belong to this agent",
            ));
        }

        // Consume the temp secret before talking to the provider; a consumed
        // request token must never be replayable even if the exchange fails.
        let token_secret = self.cache.get(&temp_key);
        self.cache.delete(&temp_key);
        let Some(token_secret) = token_secret else {
            self.cache.delete(&session_key);
            return Err(AppError::missing_temp_credentials(
                "Request token secret is missing or already used",
            ));
        };

        let result = self
            .complete_exchange(&session, &params, &token_secret)
            .await;
        // Success or failure, the session is finished
        self.cache.delete(&session_key);

        match result {
            Ok(identity) => {
                info!(
                    agent_id = %session.agent_id,
                    service = %session.service,
                    username = %identity.username,
                    "OAuth handshake completed"
                );
                Ok(CallbackOutcome {
                    success: true,
                    service: session.service,
                    identity,
                    return_url: session.return_url,
                })
            }
            Err(e) => {
                warn!(
                    agent_id = %session.agent_id,
                    service = %session.service,
                    error = %e,
                    "OAuth handshake failed"
                );
                Err(e)
            }
        }
    }

    /// Token exchange, identity fetch, and persistence for a validated session
    async fn complete_exchange(
        &self,
        session: &OAuthSession,
        params: &CallbackParams,
        token_secret: &str,
    ) -> AppResult<ServiceIdentity> {
        let connector = self.connectors.get(session.service)?;

        let access = connector
            .exchange_token(&params.request_token, token_secret, &params.verifier)
            .await?;

        let identity = match connector.fetch_identity(&access.token, &access.secret).await {
            Ok(identity) => identity,
            // The exchange response already carries identity fields; fall
            // back to them rather than failing a completed authorization.
            Err(e) if access.user_id.is_some() && access.screen_name.is_some() => {
                warn!(error = %e, "Identity fetch failed; using exchange response identity");
                ServiceIdentity {
                    user_id: access.user_id.clone().unwrap_or_default(),
                    username: access.screen_name.clone().unwrap_or_default(),
                }
            }
            Err(e) => return Err(e),
        };

        let credentials = build_credentials(session.service, &access.token, &access.secret, &identity);
        self.database
            .store_service_credentials(session.agent_id, &credentials)
            .await?;

        Ok(identity)
    }

    /// Derived connection status for one (agent, service) pair.
    ///
    /// Fail-safe: store unavailability and decryption failures report
    /// disconnected rather than erroring, and never report connected on
    /// ambiguous state.
    pub async fn get_connection_status(
        &self,
        agent_id: Uuid,
        service: ServiceType,
    ) -> ConnectionStatus {
        match self.database.get_service_credentials(agent_id, service).await {
            Ok(Some(record)) => ConnectionStatus {
                service_name: service,
                is_connected: true,
                username: record.credentials.username().map(str::to_owned),
                user_id: record.credentials.user_id().map(str::to_owned),
                last_checked: Utc::now(),
            },
            Ok(None) => ConnectionStatus::disconnected(service),
            Err(e) => {
                warn!(%agent_id, %service, error = %e, "Status check degraded to disconnected");
                ConnectionStatus::disconnected(service)
            }
        }
    }

    /// Status for every supported service. Each service is resolved
    /// independently so one store failure cannot block the rest.
    pub async fn get_all_connection_statuses(&self, agent_id: Uuid) -> Vec<ConnectionStatus> {
        let mut statuses = Vec::with_capacity(ServiceType::ALL.len());
        for service in ServiceType::ALL {
            statuses.push(self.get_connection_status(agent_id, service).await);
        }
        statuses
    }

    /// Revoke stored credentials for (agent, service).
    ///
    /// # Errors
    ///
    /// Propagates `StoreUnavailable`; a failed revoke must not look like a
    /// successful disconnect.
    pub async fn disconnect(&self, agent_id: Uuid, service: ServiceType) -> AppResult<()> {
        self.database
            .revoke_service_credentials(agent_id, service)
            .await?;
        info!(%agent_id, %service, "Service disconnected");
        Ok(())
    }

    /// Verify stored credentials against the live provider API.
    ///
    /// Returns a non-error outcome for the expected failure modes (nothing
    /// stored, provider refused) so the route layer can render them.
    pub async fn test_connection(
        &self,
        agent_id: Uuid,
        service: ServiceType,
    ) -> TestConnectionOutcome {
        let record = match self.database.get_service_credentials(agent_id, service).await {
            Ok(Some(record)) => record,
            Ok(None) => return TestConnectionOutcome::failed("No credentials stored"),
            Err(e) => return TestConnectionOutcome::failed(e.to_string()),
        };

        let Some((token, secret)) = record.credentials.token_pair() else {
            return TestConnectionOutcome::failed(format!(
                "Stored credentials for '{service}' do not support connection testing"
            ));
        };

        let connector = match self.connectors.get(service) {
            Ok(connector) => connector,
            Err(e) => return TestConnectionOutcome::failed(e.to_string()),
        };

        match connector.fetch_identity(token, secret).await {
            Ok(identity) => TestConnectionOutcome {
                success: true,
                identity: Some(identity),
                error: None,
            },
            Err(e) => TestConnectionOutcome::failed(e.to_string()),
        }
    }
}

/// Fresh random state token: 32 bytes of entropy, hex-encoded to 64 chars
fn generate_state_token() -> String {
    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Shape the stored payload for the connected service
fn build_credentials(
    service: ServiceType,
    access_token: &str,
    access_token_secret: &str,
    identity: &ServiceIdentity,
) -> ServiceCredentials {
    match service {
        ServiceType::Twitter => ServiceCredentials::Twitter(TwitterCredentials {
            api_key: None,
            api_secret_key: None,
            access_token: access_token.to_owned(),
            access_token_secret: access_token_secret.to_owned(),
            user_id: Some(identity.user_id.clone()),
            username: Some(identity.username.clone()),
        }),
        _ => ServiceCredentials::generic(
            service,
            GenericCredentials {
                access_token: Some(access_token.to_owned()),
                username: Some(identity.username.clone()),
                user_id: Some(identity.user_id.clone()),
                extra: serde_json::Map::new(),
            },
        ),
    }
}
