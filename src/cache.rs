// ABOUTME: Bounded, expiring in-memory cache for ephemeral OAuth handshake state
// ABOUTME: TTL expiry is the primary eviction mechanism; LRU capacity is a DoS backstop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::constants::oauth_config::{SESSION_CACHE_CAPACITY, SESSION_TTL_MINUTES};
use crate::models::ServiceType;

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local cache for OAuth sessions and temporary request-token
/// secrets.
///
/// Two logical namespaces share this instance under disjoint key prefixes
/// (see [`SessionCache::session_key`] and [`SessionCache::temp_secret_key`]).
/// Entries expire after the handshake TTL; the LRU bound caps memory if a
/// burst of initiations outpaces expiry. Contents are intentionally lost on
/// restart: an interrupted handshake fails and the user retries.
pub struct SessionCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCache {
    /// Cache with the standard handshake bounds (1000 entries, 15 min TTL)
    #[must_use]
    pub fn new() -> Self {
        let ttl_secs = u64::try_from(SESSION_TTL_MINUTES * 60).unwrap_or(900);
        Self::with_config(SESSION_CACHE_CAPACITY, Duration::from_secs(ttl_secs))
    }

    /// Cache with explicit capacity and TTL
    #[must_use]
    pub fn with_config(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Insert or replace a value under `key`
    pub fn put(&self, key: &str, value: impl Into<String>) {
        let entry = CacheEntry {
            value: value.into(),
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key.to_owned(), entry);
    }

    /// Fetch a live value. Expired or absent keys return `None`; an expired
    /// entry is removed on the way out.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// Remove a key, if present
    pub fn delete(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop(key);
    }

    /// Number of entries currently held (including not-yet-evicted expired ones)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Namespaced key for an OAuth session, keyed by state token
    #[must_use]
    pub fn session_key(state: &str) -> String {
        format!("oauth_session:{state}")
    }

    /// Namespaced key for a request-token secret, keyed by the composite
    /// (agent, service, request token)
    #[must_use]
    pub fn temp_secret_key(agent_id: Uuid, service: ServiceType, request_token: &str) -> String {
        format!("temp_secret:{agent_id}:{service}:{request_token}")
    }
}
