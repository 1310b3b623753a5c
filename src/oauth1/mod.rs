// ABOUTME: OAuth 1.0a request signing (RFC 5849) for provider API calls
// ABOUTME: HMAC-SHA1 signature base string construction and Authorization header assembly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

/// Twitter/X connector built on this signing layer
pub mod twitter;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use ring::hmac;
use std::time::{SystemTime, UNIX_EPOCH};

/// OAuth 1.0a consumer (application) credential pair
#[derive(Debug, Clone)]
pub struct ConsumerCredentials {
    /// Consumer key identifying the application
    pub key: String,
    /// Consumer secret used in the signing key
    pub secret: String,
}

/// RFC 3986 percent-encoding as required by the OAuth 1.0a spec
fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Random nonce for a single signed request
#[must_use]
pub fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Current UNIX timestamp in seconds, as the protocol expects it
#[must_use]
pub fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
        .to_string()
}

/// Compute the HMAC-SHA1 signature over the normalized request.
///
/// `params` must contain every oauth protocol parameter plus all query and
/// body parameters of the request; the base string is built by
/// percent-encoding each pair, sorting, and joining per RFC 5849 §3.4.1.
/// `token_secret` is empty during the request-token step.
#[must_use]
pub fn sign(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    token_secret: Option<&str>,
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    );

    let signing_key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret.unwrap_or(""))
    );

    // SHA-1 is mandated by the OAuth 1.0a HMAC-SHA1 signature method
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
    let tag = hmac::sign(&key, base_string.as_bytes());
    STANDARD.encode(tag.as_ref())
}

/// Build a signed `Authorization: OAuth …` header value.
///
/// `extra_oauth` carries step-specific protocol parameters
/// (`oauth_callback`, `oauth_verifier`). `request_params` are query or body
/// parameters that participate in the signature but stay out of the header.
#[must_use]
pub fn authorization_header(
    method: &str,
    url: &str,
    consumer: &ConsumerCredentials,
    token: Option<(&str, &str)>,
    extra_oauth: &[(&str, &str)],
    request_params: &[(&str, &str)],
) -> String {
    let mut oauth_params: Vec<(String, String)> = vec![
        ("oauth_consumer_key".to_owned(), consumer.key.clone()),
        ("oauth_nonce".to_owned(), nonce()),
        ("oauth_signature_method".to_owned(), "HMAC-SHA1".to_owned()),
        ("oauth_timestamp".to_owned(), timestamp()),
        ("oauth_version".to_owned(), "1.0".to_owned()),
    ];
    if let Some((token_value, _)) = token {
        oauth_params.push(("oauth_token".to_owned(), token_value.to_owned()));
    }
    for (k, v) in extra_oauth {
        oauth_params.push(((*k).to_owned(), (*v).to_owned()));
    }

    let mut signed_params = oauth_params.clone();
    for (k, v) in request_params {
        signed_params.push(((*k).to_owned(), (*v).to_owned()));
    }

    let signature = sign(
        method,
        url,
        &signed_params,
        &consumer.secret,
        token.map(|(_, secret)| secret),
    );
    oauth_params.push(("oauth_signature".to_owned(), signature));
    oauth_params.sort();

    let header_params = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {header_params}")
}
