// ABOUTME: Application error taxonomy for the credential broker
// ABOUTME: Typed error codes distinguish protocol, provider, crypto, and storage failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use http::StatusCode;
use thiserror::Error;

/// Machine-readable error codes for broker failures.
///
/// Handshake-protocol violations (`InvalidOrExpiredSession`,
/// `MissingTempCredentials`, `MalformedCallback`) are terminal for that
/// handshake attempt; the caller must restart at initiate. `DecryptionError`
/// is deliberately distinct from `NotFound` so key mismatch or data
/// corruption is diagnosable instead of looking like "never connected".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Required provider or encryption configuration is missing
    ConfigurationError,
    /// The external OAuth provider rejected a request or returned malformed data
    ProviderError,
    /// The external OAuth provider refused the token exchange or identity check
    ProviderAuthError,
    /// OAuth session is unknown, expired, or owned by a different agent
    InvalidOrExpiredSession,
    /// Request-token secret is absent (already consumed or expired)
    MissingTempCredentials,
    /// Callback is missing one or more required parameters
    MalformedCallback,
    /// Stored ciphertext could not be decrypted with the current key
    DecryptionError,
    /// Database or infrastructure failure
    StoreUnavailable,
    /// Caller-supplied input failed validation
    InvalidInput,
    /// Requested entity does not exist
    NotFound,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// Stable string form used in logs and API error bodies
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::ProviderError => "provider_error",
            Self::ProviderAuthError => "provider_auth_error",
            Self::InvalidOrExpiredSession => "invalid_or_expired_session",
            Self::MissingTempCredentials => "missing_temp_credentials",
            Self::MalformedCallback => "malformed_callback",
            Self::DecryptionError => "decryption_error",
            Self::StoreUnavailable => "store_unavailable",
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::InternalError => "internal_error",
        }
    }

    /// HTTP status the route layer maps this code to
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::ConfigurationError | Self::InternalError | Self::DecryptionError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ProviderError | Self::ProviderAuthError => StatusCode::BAD_GATEWAY,
            Self::InvalidOrExpiredSession | Self::MissingTempCredentials => StatusCode::GONE,
            Self::MalformedCallback | Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Application error carrying a typed code and a human-readable message
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .code.as_str())]
pub struct AppError {
    /// Typed error code
    pub code: ErrorCode,
    /// Human-readable detail
    pub message: String,
}

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Required provider or encryption configuration is missing
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message)
    }

    /// Provider request failed or returned malformed data
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderError, message)
    }

    /// Provider refused the token exchange or identity check
    pub fn provider_auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderAuthError, message)
    }

    /// OAuth session is unknown, expired, or foreign
    pub fn invalid_session(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidOrExpiredSession, message)
    }

    /// Request-token secret absent at callback time
    pub fn missing_temp_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingTempCredentials, message)
    }

    /// Callback missing required parameters
    pub fn malformed_callback(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedCallback, message)
    }

    /// Ciphertext unreadable with the current key
    pub fn decryption(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecryptionError, message)
    }

    /// Database or infrastructure failure
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    /// Caller-supplied input failed validation
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Requested entity does not exist
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::store_unavailable(format!("Database operation failed: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("Serialization failed: {err}"))
    }
}
