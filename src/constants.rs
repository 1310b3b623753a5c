// ABOUTME: Application constants for OAuth endpoints, session bounds, and configuration keys
// ABOUTME: Centralizes tunables so handshake and cache behavior is auditable in one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

/// OAuth handshake and session-cache tunables
pub mod oauth_config {
    /// How long an in-flight handshake stays valid
    pub const SESSION_TTL_MINUTES: i64 = 15;

    /// Upper bound on cached sessions and temp secrets. TTL expiry is the
    /// primary eviction mechanism; LRU is the backstop against unbounded
    /// growth.
    pub const SESSION_CACHE_CAPACITY: usize = 1000;

    /// Entropy of the CSRF state token, in bytes (hex-encoded to 64 chars)
    pub const STATE_TOKEN_BYTES: usize = 32;

    /// Hard timeout on provider network calls. A provider hang must surface
    /// as a bounded-time error, not block the request.
    pub const PROVIDER_TIMEOUT_SECS: u64 = 10;

    /// Minimum length for the configured encryption key. Shorter keys
    /// disable encryption entirely (never truncated).
    pub const MIN_ENCRYPTION_KEY_LEN: usize = 32;
}

/// Twitter/X OAuth 1.0a protocol endpoints
pub mod twitter {
    /// Default API base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

    /// Step 1: obtain an unauthorized request token
    pub const REQUEST_TOKEN_PATH: &str = "/oauth/request_token";

    /// Step 2: user authorization redirect target
    pub const AUTHORIZE_PATH: &str = "/oauth/authorize";

    /// Step 3: exchange verifier for a permanent access token
    pub const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";

    /// Identity lookup for the authenticated user
    pub const VERIFY_CREDENTIALS_PATH: &str = "/1.1/account/verify_credentials.json";
}

/// Environment variable names recognized by `BrokerConfig::from_env`
pub mod env_config {
    /// Symmetric key for credential encryption at rest (min 32 chars)
    pub const ENCRYPTION_KEY: &str = "TETHER_ENCRYPTION_KEY";

    /// Twitter OAuth 1.0a consumer key
    pub const TWITTER_CONSUMER_KEY: &str = "TWITTER_CONSUMER_KEY";

    /// Twitter OAuth 1.0a consumer secret
    pub const TWITTER_CONSUMER_SECRET: &str = "TWITTER_CONSUMER_SECRET";

    /// Public base URL the provider redirects back to
    pub const CALLBACK_BASE_URL: &str = "TETHER_CALLBACK_BASE_URL";

    /// HTTP listen port
    pub const HTTP_PORT: &str = "TETHER_HTTP_PORT";

    /// SQLite database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
}

/// Fallback values for optional configuration
pub mod defaults {
    /// Database used when `DATABASE_URL` is unset
    pub const DATABASE_URL: &str = "sqlite:tether.db";

    /// Listen port used when `TETHER_HTTP_PORT` is unset
    pub const HTTP_PORT: u16 = 8080;
}
