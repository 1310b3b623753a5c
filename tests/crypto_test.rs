// ABOUTME: Tests for the credential cipher: round trips, tamper rejection, degraded mode
// ABOUTME: Verifies the nonce_hex:ciphertext_hex format and the short-key policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use tether::crypto::SecretCipher;
use tether::errors::ErrorCode;

const KEY: &str = "an-encryption-key-of-32-chars-or-more";

#[test]
fn encrypt_decrypt_round_trip() {
    let cipher = SecretCipher::new(Some(KEY));
    let plaintext = r#"{"service":"twitter","access_token":"tok","access_token_secret":"sec"}"#;

    let ciphertext = cipher.encrypt(plaintext).expect("encrypt failed");
    assert_ne!(ciphertext, plaintext);

    let decrypted = cipher.decrypt(&ciphertext).expect("decrypt failed");
    assert_eq!(decrypted, plaintext);
}

#[test]
fn ciphertext_format_is_nonce_and_payload_hex() {
    let cipher = SecretCipher::new(Some(KEY));
    let ciphertext = cipher.encrypt("secret").expect("encrypt failed");

    let parts: Vec<&str> = ciphertext.split(':').collect();
    assert_eq!(parts.len(), 2);
    // 12-byte nonce is 24 hex chars
    assert_eq!(parts[0].len(), 24);
    assert!(parts[0].chars().all(|c| c.is_ascii_hexdigit()));
    assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn identical_plaintexts_produce_distinct_ciphertexts() {
    let cipher = SecretCipher::new(Some(KEY));
    let a = cipher.encrypt("same payload").expect("encrypt failed");
    let b = cipher.encrypt("same payload").expect("encrypt failed");

    assert_ne!(a, b);
    assert_eq!(cipher.decrypt(&a).expect("decrypt a"), "same payload");
    assert_eq!(cipher.decrypt(&b).expect("decrypt b"), "same payload");
}

#[test]
fn tampered_ciphertext_is_rejected() {
    let cipher = SecretCipher::new(Some(KEY));
    let ciphertext = cipher.encrypt("secret").expect("encrypt failed");

    // Flip one hex digit in the payload half
    let (nonce, payload) = ciphertext.split_once(':').expect("two parts");
    let mut chars: Vec<char> = payload.chars().collect();
    chars[0] = if chars[0] == '0' { '1' } else { '0' };
    let tampered: String = chars.into_iter().collect();

    let err = cipher
        .decrypt(&format!("{nonce}:{tampered}"))
        .expect_err("tampered ciphertext must not decrypt");
    assert_eq!(err.code, ErrorCode::DecryptionError);
}

#[test]
fn wrong_key_is_rejected() {
    let cipher = SecretCipher::new(Some(KEY));
    let ciphertext = cipher.encrypt("secret").expect("encrypt failed");

    let other = SecretCipher::new(Some("a-completely-different-32-char-key!!"));
    let err = other
        .decrypt(&ciphertext)
        .expect_err("wrong key must not decrypt");
    assert_eq!(err.code, ErrorCode::DecryptionError);
}

#[test]
fn malformed_ciphertext_is_rejected() {
    let cipher = SecretCipher::new(Some(KEY));

    for bad in ["no-delimiter", "a:b:c", "zzzz:abcd", "0011:zzzz", ":"] {
        let err = cipher
            .decrypt(bad)
            .expect_err("malformed ciphertext must not decrypt");
        assert_eq!(err.code, ErrorCode::DecryptionError, "input: {bad}");
    }
}

#[test]
fn missing_key_runs_in_pass_through_mode() {
    let cipher = SecretCipher::new(None);
    assert!(cipher.is_degraded());

    let stored = cipher.encrypt("plaintext secret").expect("encrypt failed");
    assert_eq!(stored, "plaintext secret");
    assert_eq!(cipher.decrypt(&stored).expect("decrypt failed"), "plaintext secret");
}

#[test]
fn short_key_disables_encryption_instead_of_truncating() {
    let cipher = SecretCipher::new(Some("too-short"));
    assert!(cipher.is_degraded());
    assert_eq!(cipher.encrypt("data").expect("encrypt failed"), "data");
}

#[test]
fn full_length_key_is_not_degraded() {
    let cipher = SecretCipher::new(Some(KEY));
    assert!(!cipher.is_degraded());
}
