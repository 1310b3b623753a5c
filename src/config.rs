// ABOUTME: Environment-driven configuration for the broker server
// ABOUTME: Missing provider credentials disable the initiate path instead of crashing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use std::env;
use tracing::warn;

use crate::constants::{defaults, env_config};
use crate::errors::{AppError, AppResult};

/// Twitter OAuth 1.0a application credentials
#[derive(Debug, Clone)]
pub struct TwitterOAuthConfig {
    /// Consumer key
    pub consumer_key: String,
    /// Consumer secret
    pub consumer_secret: String,
}

/// Broker configuration, read exclusively from the environment
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// SQLite database URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Public base URL the provider redirects back to
    pub callback_base_url: String,
    /// Credential encryption key; `None` runs the cipher in degraded
    /// pass-through mode
    pub encryption_key: Option<String>,
    /// Twitter application credentials; `None` disables the Twitter
    /// initiate path with a configuration error
    pub twitter: Option<TwitterOAuthConfig>,
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl BrokerConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a set variable fails to parse
    /// (e.g. a non-numeric port). Absent optional variables fall back to
    /// defaults or disable the corresponding feature.
    pub fn from_env() -> AppResult<Self> {
        let database_url =
            env_var(env_config::DATABASE_URL).unwrap_or_else(|| defaults::DATABASE_URL.to_owned());

        let http_port = match env_var(env_config::HTTP_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                AppError::config(format!(
                    "{} must be a port number: {e}",
                    env_config::HTTP_PORT
                ))
            })?,
            None => defaults::HTTP_PORT,
        };

        let callback_base_url = env_var(env_config::CALLBACK_BASE_URL)
            .unwrap_or_else(|| format!("http://localhost:{http_port}"));

        let encryption_key = env_var(env_config::ENCRYPTION_KEY);

        let twitter = match (
            env_var(env_config::TWITTER_CONSUMER_KEY),
            env_var(env_config::TWITTER_CONSUMER_SECRET),
        ) {
            (Some(consumer_key), Some(consumer_secret)) => Some(TwitterOAuthConfig {
                consumer_key,
                consumer_secret,
            }),
            (None, None) => None,
            _ => {
                warn!(
                    "Twitter OAuth requires both {} and {}; connection initiation disabled",
                    env_config::TWITTER_CONSUMER_KEY,
                    env_config::TWITTER_CONSUMER_SECRET
                );
                None
            }
        };

        Ok(Self {
            database_url,
            http_port,
            callback_base_url,
            encryption_key,
            twitter,
        })
    }
}
