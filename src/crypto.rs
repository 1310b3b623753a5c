// ABOUTME: Symmetric encryption for credential payloads at rest (AES-256-GCM)
// ABOUTME: Self-describing nonce_hex:ciphertext_hex encoding with a loud pass-through degraded mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::digest::{digest, SHA256};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::warn;

use crate::constants::oauth_config::MIN_ENCRYPTION_KEY_LEN;
use crate::errors::{AppError, AppResult};

/// AES-GCM nonce size in bytes
const NONCE_LEN: usize = 12;

/// Symmetric cipher for credential payloads.
///
/// The 256-bit key is derived as SHA-256 of the configured secret, so any
/// string of at least [`MIN_ENCRYPTION_KEY_LEN`] characters is usable.
/// Ciphertext is encoded as `nonce_hex:ciphertext_hex` with a fresh random
/// nonce per call, so decryption needs no external nonce storage and
/// identical plaintexts never produce identical ciphertexts.
///
/// When no key (or a too-short key) is configured the cipher runs in
/// pass-through mode: payloads are stored as-is. This is a security-relevant
/// degradation, signaled with a standing warning at construction and
/// observable via [`SecretCipher::is_degraded`]. Short keys are never
/// silently truncated into key material.
#[derive(Clone)]
pub struct SecretCipher {
    key: Option<Vec<u8>>,
}

impl SecretCipher {
    /// Build a cipher from the configured secret, if any
    #[must_use]
    pub fn new(configured_key: Option<&str>) -> Self {
        let key = match configured_key {
            Some(secret) if secret.len() >= MIN_ENCRYPTION_KEY_LEN => {
                Some(digest(&SHA256, secret.as_bytes()).as_ref().to_vec())
            }
            Some(secret) => {
                warn!(
                    key_len = secret.len(),
                    min_len = MIN_ENCRYPTION_KEY_LEN,
                    "Encryption key is too short; ENCRYPTION DISABLED, credentials will be stored in plaintext"
                );
                None
            }
            None => {
                warn!(
                    "No encryption key configured; ENCRYPTION DISABLED, credentials will be stored in plaintext"
                );
                None
            }
        };
        Self { key }
    }

    /// Whether the cipher is running in pass-through (plaintext) mode
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.key.is_none()
    }

    /// Encrypt a payload, returning `nonce_hex:ciphertext_hex`.
    ///
    /// In degraded mode the plaintext is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if nonce generation or the AEAD seal fails.
    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let Some(key_bytes) = &self.key else {
            return Ok(plaintext.to_owned());
        };

        let rng = SystemRandom::new();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut nonce_bytes)
            .map_err(|e| AppError::internal(format!("Failed to generate nonce: {e}")))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let unbound_key = UnboundKey::new(&AES_256_GCM, key_bytes)
            .map_err(|e| AppError::internal(format!("Failed to create encryption key: {e}")))?;
        let key = LessSafeKey::new(unbound_key);

        let mut data = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(nonce, Aad::empty(), &mut data)
            .map_err(|e| AppError::internal(format!("Failed to encrypt data: {e}")))?;

        Ok(format!("{}:{}", hex::encode(nonce_bytes), hex::encode(data)))
    }

    /// Decrypt a `nonce_hex:ciphertext_hex` payload.
    ///
    /// In degraded mode the input is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `DecryptionError` if the format is malformed (wrong number
    /// of delimited parts, invalid hex) or the AEAD rejects the data
    /// (tampered ciphertext, wrong key).
    pub fn decrypt(&self, ciphertext: &str) -> AppResult<String> {
        let Some(key_bytes) = &self.key else {
            return Ok(ciphertext.to_owned());
        };

        let mut parts = ciphertext.split(':');
        let (Some(nonce_hex), Some(data_hex), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::decryption(
                "Malformed ciphertext: expected nonce_hex:ciphertext_hex",
            ));
        };

        let nonce_bytes: [u8; NONCE_LEN] = hex::decode(nonce_hex)
            .map_err(|e| AppError::decryption(format!("Invalid nonce encoding: {e}")))?
            .try_into()
            .map_err(|_| AppError::decryption("Invalid nonce length"))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut data = hex::decode(data_hex)
            .map_err(|e| AppError::decryption(format!("Invalid ciphertext encoding: {e}")))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, key_bytes)
            .map_err(|e| AppError::internal(format!("Failed to create decryption key: {e}")))?;
        let key = LessSafeKey::new(unbound_key);

        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut data)
            .map_err(|_| {
                AppError::decryption("Decryption failed: tampered ciphertext or wrong key")
            })?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| AppError::decryption(format!("Decrypted data is not valid UTF-8: {e}")))
    }
}
