// ABOUTME: Database handle over SQLite with store-level credential encryption
// ABOUTME: Owns the connection pool, schema setup, and the single encryption seam
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

/// Credential store CRUD for the `service_credentials` table
pub mod service_credentials;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::crypto::SecretCipher;
use crate::errors::{AppError, AppResult};

/// Database connection pool with encryption support.
///
/// Encryption of credential payloads happens inside this component, behind
/// the store's public operations; no caller handles ciphertext directly.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    cipher: SecretCipher,
}

impl Database {
    /// Open (creating if needed) the database and set up the schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the URL is invalid, the connection
    /// fails, or schema setup fails.
    pub async fn new(database_url: &str, cipher: SecretCipher) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::store_unavailable(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        // An in-memory database exists per connection, so the pool must not
        // grow past one connection or writes land in separate databases.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::store_unavailable(format!("Failed to connect to database: {e}"))
            })?;

        let db = Self { pool, cipher };
        db.migrate().await?;
        Ok(db)
    }

    /// Reference to the pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cipher guarding payloads at rest
    #[must_use]
    pub const fn cipher(&self) -> &SecretCipher {
        &self.cipher
    }

    /// Create the credential schema if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if any statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        info!("Setting up credential store schema");

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS service_credentials (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL,
                service_name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                credentials TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                expires_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(agent_id, service_name)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_service_credentials_agent ON service_credentials(agent_id)",
            "CREATE INDEX IF NOT EXISTS idx_service_credentials_service ON service_credentials(service_name)",
            "CREATE INDEX IF NOT EXISTS idx_service_credentials_status ON service_credentials(status)",
            "CREATE INDEX IF NOT EXISTS idx_service_credentials_active ON service_credentials(is_active)",
        ] {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        Ok(())
    }
}
