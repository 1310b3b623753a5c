// ABOUTME: Core data models for service credentials, OAuth sessions, and connection status
// ABOUTME: Credential payloads are a tagged union keyed by service name, validated at the serde boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// Closed enumeration of services an agent can connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Twitter,
    Discord,
    Telegram,
    Github,
    Google,
    Facebook,
    Linkedin,
    Instagram,
    Tiktok,
    Youtube,
    Other,
}

impl ServiceType {
    /// Every supported service, in status-reporting order
    pub const ALL: [Self; 11] = [
        Self::Twitter,
        Self::Discord,
        Self::Telegram,
        Self::Github,
        Self::Google,
        Self::Facebook,
        Self::Linkedin,
        Self::Instagram,
        Self::Tiktok,
        Self::Youtube,
        Self::Other,
    ];

    /// Canonical lowercase name, used as the database column value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Discord => "discord",
            Self::Telegram => "telegram",
            Self::Github => "github",
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Linkedin => "linkedin",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Youtube => "youtube",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(Self::Twitter),
            "discord" => Ok(Self::Discord),
            "telegram" => Ok(Self::Telegram),
            "github" => Ok(Self::Github),
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            "linkedin" => Ok(Self::Linkedin),
            "instagram" => Ok(Self::Instagram),
            "tiktok" => Ok(Self::Tiktok),
            "youtube" => Ok(Self::Youtube),
            "other" => Ok(Self::Other),
            unknown => Err(AppError::invalid_input(format!(
                "Unknown service name '{unknown}'"
            ))),
        }
    }
}

/// Lifecycle status of a stored credential record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Active,
    Inactive,
    Expired,
    Revoked,
    Pending,
}

impl CredentialStatus {
    /// Database column value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
            Self::Pending => "pending",
        }
    }

    /// Parse a database column value, `None` for unknown strings
    #[must_use]
    pub fn from_str_value(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "expired" => Some(Self::Expired),
            "revoked" => Some(Self::Revoked),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Twitter OAuth 1.0a credential bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterCredentials {
    /// Consumer (application) key, when stored alongside user tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Consumer (application) secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret_key: Option<String>,
    /// Permanent user access token
    pub access_token: String,
    /// Permanent user access token secret
    pub access_token_secret: String,
    /// Provider-issued numeric user identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Provider screen name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Credential shape for services without a dedicated typed variant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenericCredentials {
    /// Opaque access token, when the service issues one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Display username, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Provider-issued user identifier, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Service-specific fields preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-service credential payload, tagged by service name.
///
/// The tag doubles as the storage partition key, so a payload can never be
/// stored under a different service than it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum ServiceCredentials {
    Twitter(TwitterCredentials),
    Discord(GenericCredentials),
    Telegram(GenericCredentials),
    Github(GenericCredentials),
    Google(GenericCredentials),
    Facebook(GenericCredentials),
    Linkedin(GenericCredentials),
    Instagram(GenericCredentials),
    Tiktok(GenericCredentials),
    Youtube(GenericCredentials),
    Other(GenericCredentials),
}

impl ServiceCredentials {
    /// Wrap a generic payload in the variant matching `service`.
    ///
    /// Twitter payloads are strongly typed; a generic payload aimed at
    /// twitter lands under `Other` rather than faking the typed shape.
    #[must_use]
    pub fn generic(service: ServiceType, credentials: GenericCredentials) -> Self {
        match service {
            ServiceType::Twitter | ServiceType::Other => Self::Other(credentials),
            ServiceType::Discord => Self::Discord(credentials),
            ServiceType::Telegram => Self::Telegram(credentials),
            ServiceType::Github => Self::Github(credentials),
            ServiceType::Google => Self::Google(credentials),
            ServiceType::Facebook => Self::Facebook(credentials),
            ServiceType::Linkedin => Self::Linkedin(credentials),
            ServiceType::Instagram => Self::Instagram(credentials),
            ServiceType::Tiktok => Self::Tiktok(credentials),
            ServiceType::Youtube => Self::Youtube(credentials),
        }
    }

    /// Service this payload belongs to
    #[must_use]
    pub fn service_type(&self) -> ServiceType {
        match self {
            Self::Twitter(_) => ServiceType::Twitter,
            Self::Discord(_) => ServiceType::Discord,
            Self::Telegram(_) => ServiceType::Telegram,
            Self::Github(_) => ServiceType::Github,
            Self::Google(_) => ServiceType::Google,
            Self::Facebook(_) => ServiceType::Facebook,
            Self::Linkedin(_) => ServiceType::Linkedin,
            Self::Instagram(_) => ServiceType::Instagram,
            Self::Tiktok(_) => ServiceType::Tiktok,
            Self::Youtube(_) => ServiceType::Youtube,
            Self::Other(_) => ServiceType::Other,
        }
    }

    /// Display username embedded in the payload, when present
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Twitter(c) => c.username.as_deref(),
            Self::Discord(c)
            | Self::Telegram(c)
            | Self::Github(c)
            | Self::Google(c)
            | Self::Facebook(c)
            | Self::Linkedin(c)
            | Self::Instagram(c)
            | Self::Tiktok(c)
            | Self::Youtube(c)
            | Self::Other(c) => c.username.as_deref(),
        }
    }

    /// Provider user identifier embedded in the payload, when present
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Twitter(c) => c.user_id.as_deref(),
            Self::Discord(c)
            | Self::Telegram(c)
            | Self::Github(c)
            | Self::Google(c)
            | Self::Facebook(c)
            | Self::Linkedin(c)
            | Self::Instagram(c)
            | Self::Tiktok(c)
            | Self::Youtube(c)
            | Self::Other(c) => c.user_id.as_deref(),
        }
    }

    /// Signed token pair for services that can re-authenticate API calls
    #[must_use]
    pub fn token_pair(&self) -> Option<(&str, &str)> {
        match self {
            Self::Twitter(c) => Some((c.access_token.as_str(), c.access_token_secret.as_str())),
            _ => None,
        }
    }
}

/// A stored credential record, decrypted
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Row identifier
    pub id: String,
    /// Owning agent
    pub agent_id: Uuid,
    /// Service this record is for
    pub service: ServiceType,
    /// Lifecycle status
    pub status: CredentialStatus,
    /// Decrypted credential payload
    pub credentials: ServiceCredentials,
    /// Whether this record is the live one for (agent, service)
    pub is_active: bool,
    /// Optional credential expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Handshake progress recorded on the cached session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Authorized,
    Failed,
    Expired,
}

/// An in-flight OAuth handshake, held only in the session cache.
///
/// Never persisted: a process restart fails the handshake and the user
/// retries from initiate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthSession {
    /// CSRF state token correlating initiate with callback
    pub state: String,
    /// Agent that initiated the handshake
    pub agent_id: Uuid,
    /// Target service
    pub service: ServiceType,
    /// Where to send the user after completion
    pub return_url: Option<String>,
    /// Handshake progress
    pub status: SessionStatus,
    /// When the handshake was initiated
    pub created_at: DateTime<Utc>,
    /// Hard deadline for the callback
    pub expires_at: DateTime<Utc>,
}

impl OAuthSession {
    /// Active validity check, independent of cache-level TTL eviction
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Derived, user-facing connection status for one (agent, service) pair
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    /// Service being reported on
    pub service_name: ServiceType,
    /// Whether an active credential record exists
    pub is_connected: bool,
    /// Username from the stored payload, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// User identifier from the stored payload, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When this status was computed
    pub last_checked: DateTime<Utc>,
}

impl ConnectionStatus {
    /// Fail-safe default used when no record exists or the store is unreachable
    #[must_use]
    pub fn disconnected(service: ServiceType) -> Self {
        Self {
            service_name: service,
            is_connected: false,
            username: None,
            user_id: None,
            last_checked: Utc::now(),
        }
    }
}

/// Provider-issued request token pair from handshake step one
#[derive(Debug, Clone)]
pub struct RequestToken {
    /// Public request token, echoed back at callback time
    pub token: String,
    /// Request-token secret, kept server-side only
    pub secret: String,
    /// Whether the provider confirmed the callback URL
    pub callback_confirmed: bool,
}

/// Permanent access token pair from handshake step three
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Permanent access token
    pub token: String,
    /// Permanent access token secret
    pub secret: String,
    /// User identifier, when the provider returns it with the exchange
    pub user_id: Option<String>,
    /// Screen name, when the provider returns it with the exchange
    pub screen_name: Option<String>,
}

/// Authenticated identity fetched from the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceIdentity {
    /// Provider user identifier
    pub user_id: String,
    /// Provider username / screen name
    pub username: String,
}
