// ABOUTME: Credential store operations for per-agent, per-service encrypted credentials
// ABOUTME: Atomic upsert, active-row reads, soft revoke, and existence checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{CredentialRecord, CredentialStatus, ServiceCredentials, ServiceType};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Store credentials for (agent, service) as a single atomic upsert.
    ///
    /// The payload is serialized, encrypted, and written with
    /// `ON CONFLICT(agent_id, service_name) DO UPDATE`, so concurrent
    /// writers to the same pair cannot produce duplicate rows or lost
    /// updates; the last writer wins. Re-authentication reactivates a
    /// previously revoked row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Encryption fails
    /// - The database operation fails (`StoreUnavailable`)
    pub async fn store_service_credentials(
        &self,
        agent_id: Uuid,
        credentials: &ServiceCredentials,
    ) -> AppResult<()> {
        let service = credentials.service_type();
        let payload = serde_json::to_string(credentials)?;
        let encrypted = self.cipher().encrypt(&payload)?;
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO service_credentials (
                id, agent_id, service_name, status, credentials,
                is_active, expires_at, created_at, updated_at
            ) VALUES ($1, $2, $3, 'active', $4, 1, NULL, $5, $6)
            ON CONFLICT (agent_id, service_name)
            DO UPDATE SET
                credentials = excluded.credentials,
                status = 'active',
                is_active = 1,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(agent_id.to_string())
        .bind(service.as_str())
        .bind(&encrypted)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| {
            AppError::store_unavailable(format!("Failed to upsert service credentials: {e}"))
        })?;

        Ok(())
    }

    /// Fetch the active credential record for (agent, service).
    ///
    /// Returns `None` when no active record exists; absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database query fails (`StoreUnavailable`)
    /// - The stored ciphertext cannot be decrypted (`DecryptionError`) —
    ///   surfaced distinctly from "not found" so key mismatch or corruption
    ///   is diagnosable
    pub async fn get_service_credentials(
        &self,
        agent_id: Uuid,
        service: ServiceType,
    ) -> AppResult<Option<CredentialRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, agent_id, service_name, status, credentials,
                   is_active, expires_at, created_at, updated_at
            FROM service_credentials
            WHERE agent_id = $1 AND service_name = $2 AND is_active = 1
            ",
        )
        .bind(agent_id.to_string())
        .bind(service.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            AppError::store_unavailable(format!("Failed to query service credentials: {e}"))
        })?;

        row.map_or_else(
            || Ok(None),
            |row| Ok(Some(self.row_to_credential_record(&row)?)),
        )
    }

    /// Revoke credentials for (agent, service).
    ///
    /// Soft delete: the row is kept with `is_active = 0` and
    /// `status = 'revoked'`. All read paths filter on `is_active`, and the
    /// upsert reactivates the row on re-authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_service_credentials(
        &self,
        agent_id: Uuid,
        service: ServiceType,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE service_credentials
            SET is_active = 0, status = 'revoked', updated_at = $3
            WHERE agent_id = $1 AND service_name = $2
            ",
        )
        .bind(agent_id.to_string())
        .bind(service.as_str())
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| {
            AppError::store_unavailable(format!("Failed to revoke service credentials: {e}"))
        })?;

        Ok(())
    }

    /// Cheap existence check for an active credential record.
    ///
    /// # Errors
    ///
    /// Returns an error only on genuine infrastructure failure, never on
    /// absence.
    pub async fn has_service_credentials(
        &self,
        agent_id: Uuid,
        service: ServiceType,
    ) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM service_credentials
            WHERE agent_id = $1 AND service_name = $2 AND is_active = 1
            ",
        )
        .bind(agent_id.to_string())
        .bind(service.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            AppError::store_unavailable(format!("Failed to check service credentials: {e}"))
        })?;

        Ok(count > 0)
    }

    /// Decrypt and deserialize a row into a `CredentialRecord`
    fn row_to_credential_record(&self, row: &SqliteRow) -> AppResult<CredentialRecord> {
        let agent_id_str: String = row.get("agent_id");
        let agent_id = Uuid::parse_str(&agent_id_str)
            .map_err(|e| AppError::internal(format!("Invalid agent id in store: {e}")))?;

        let service_str: String = row.get("service_name");
        let service = service_str.parse::<ServiceType>()?;

        let status_str: String = row.get("status");
        let status = CredentialStatus::from_str_value(&status_str).unwrap_or(CredentialStatus::Inactive);

        let encrypted: String = row.get("credentials");
        let payload = self.cipher().decrypt(&encrypted)?;
        let credentials: ServiceCredentials = serde_json::from_str(&payload)
            .map_err(|e| AppError::internal(format!("Stored credential payload is invalid: {e}")))?;

        let is_active: i64 = row.get("is_active");

        Ok(CredentialRecord {
            id: row.get("id"),
            agent_id,
            service,
            status,
            credentials,
            is_active: is_active != 0,
            expires_at: row.get::<Option<DateTime<Utc>>, _>("expires_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
