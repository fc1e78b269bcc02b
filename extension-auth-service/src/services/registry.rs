//! Pending-request registry: the in-memory store of in-flight handshakes.
//!
//! The registry is the only shared mutable resource in the handshake core.
//! It is explicitly owned (constructed in main, injected via `Arc`) rather
//! than a module-level singleton, so tests get isolated registries. All
//! read-modify-write sequences are atomic per key through DashMap's entry
//! and shard locking.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::PendingAuthRequest;
use crate::services::{state_token, token_binding};

/// Outcome of a token-binding check for a given state.
#[derive(Debug, Clone)]
pub enum TokenCheck {
    /// Record exists and binding (if any) is satisfied.
    Verified(PendingAuthRequest),
    /// Record exists but the supplied token does not hash to the stored value.
    Mismatch,
    /// No record for this state; never-existed and swept are indistinguishable.
    UnknownState,
}

#[derive(Debug, Default)]
pub struct PendingRequestRegistry {
    requests: DashMap<String, PendingAuthRequest>,
}

impl PendingRequestRegistry {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Allocate a state token and store a new record with `created_at = now`.
    ///
    /// The vacant-entry insert makes allocation atomic: two concurrent
    /// creates can never collide on the same state. A collision with a live
    /// token (negligible at 128 bits, but cheap to handle) re-issues.
    pub fn create(
        &self,
        extension_id: String,
        redirect_url: Option<String>,
        token_hash: Option<String>,
    ) -> String {
        loop {
            let state = state_token::issue();
            match self.requests.entry(state.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(entry) => {
                    entry.insert(PendingAuthRequest::new(
                        state.clone(),
                        extension_id,
                        redirect_url,
                        token_hash,
                    ));
                    return state;
                }
            }
        }
    }

    /// Pure lookup; does not mutate the record.
    pub fn get(&self, state: &str) -> Option<PendingAuthRequest> {
        self.requests.get(state).map(|r| r.clone())
    }

    /// Refresh `created_at` on an existing record, extending its life so a
    /// user reloading the completion page mid-login does not lose the
    /// handshake. Forward-only: a touch never rolls the anchor back.
    /// Idempotent.
    pub fn touch(&self, state: &str) -> Option<PendingAuthRequest> {
        self.requests.get_mut(state).map(|mut r| {
            let now = Utc::now();
            if now > r.created_at {
                r.created_at = now;
            }
            r.clone()
        })
    }

    /// Remove a record. Only the sweeper calls this; a completed handshake
    /// is left to age out so the completion page survives reloads.
    pub fn delete(&self, state: &str) -> Option<PendingAuthRequest> {
        self.requests.remove(state).map(|(_, r)| r)
    }

    /// Check the optional token binding for a state.
    ///
    /// Binding is opt-in and not enforced by default: with no stored hash,
    /// or with a stored hash but no supplied token, the check passes
    /// vacuously. Only a supplied token that fails the constant-time hash
    /// comparison yields a mismatch.
    pub fn check_token(&self, state: &str, supplied: Option<&str>) -> TokenCheck {
        let Some(record) = self.get(state) else {
            return TokenCheck::UnknownState;
        };

        match (&record.token_hash, supplied) {
            (Some(stored), Some(token)) if !token_binding::token_matches(stored, token) => {
                TokenCheck::Mismatch
            }
            _ => TokenCheck::Verified(record),
        }
    }

    /// Evict every record older than `ttl`.
    ///
    /// Snapshot-then-delete: expired keys are collected first, then removed
    /// under a re-check of the expiry condition, so a `touch` racing the
    /// sweep deterministically either saves the record (refreshed age) or
    /// loses it - never a phantom survival with a stale anchor.
    pub fn sweep_expired(&self, ttl: Duration) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .requests
            .iter()
            .filter(|entry| entry.value().is_expired(now, ttl))
            .map(|entry| entry.key().clone())
            .collect();

        let mut evicted = 0;
        for state in expired {
            if self
                .requests
                .remove_if(&state, |_, r| r.is_expired(Utc::now(), ttl))
                .is_some()
            {
                tracing::debug!(state = %state, "Evicted expired handshake request");
                evicted += 1;
            }
        }
        evicted
    }

    #[cfg(test)]
    fn backdate(&self, state: &str, by: Duration) {
        let mut r = self.requests.get_mut(state).unwrap();
        r.created_at = r.created_at - by;
    }
}
