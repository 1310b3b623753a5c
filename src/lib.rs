// ABOUTME: Library entry point for the Tether credential broker
// ABOUTME: Encrypted credential storage plus the OAuth 1.0a handshake state machine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

#![deny(unsafe_code)]

//! # Tether
//!
//! A credential broker for third-party service connections attached to a
//! conversational agent runtime. Tether mediates encrypted at-rest storage
//! of per-agent, per-service credentials, the OAuth 1.0a three-legged
//! handshake against Twitter/X, and the short-lived session tracking the
//! redirect-based flow requires.
//!
//! ## Architecture
//!
//! - **`crypto`**: symmetric encryption of credential payloads
//! - **`database`**: durable credential store with atomic upserts
//! - **`cache`**: bounded, expiring cache for in-flight handshake state
//! - **`connectors`**: per-service capability trait and dispatch registry
//! - **`broker`**: the handshake engine and connection status resolver
//! - **`routes`**: thin HTTP adapters over the broker facade
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tether::broker::ConnectionBroker;
//! use tether::cache::SessionCache;
//! use tether::connectors::ConnectorRegistry;
//! use tether::crypto::SecretCipher;
//! use tether::database::Database;
//! use tether::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let cipher = SecretCipher::new(Some("a-key-of-at-least-32-characters!"));
//!     let database = Arc::new(Database::new("sqlite::memory:", cipher).await?);
//!     let broker = ConnectionBroker::new(
//!         database,
//!         Arc::new(SessionCache::new()),
//!         ConnectorRegistry::new(),
//!         "http://localhost:8080",
//!     );
//!     let _ = broker;
//!     Ok(())
//! }
//! ```

/// OAuth handshake engine, status resolver, and broker facade
pub mod broker;

/// Bounded, expiring session cache for handshake state
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Service connector trait and dispatch registry
pub mod connectors;

/// Application constants and tunables
pub mod constants;

/// Symmetric encryption for credentials at rest
pub mod crypto;

/// Durable credential store over SQLite
pub mod database;

/// Application error taxonomy
pub mod errors;

/// Core data models
pub mod models;

/// OAuth 1.0a signing and the Twitter connector
pub mod oauth1;

/// HTTP route layer
pub mod routes;
