//! Pending handshake records - one per in-flight extension authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One in-flight extension handshake, keyed by its `state` token.
///
/// Lifecycle: created at initiate, read (and touched) by poll, touched once
/// more when a user completes login carrying this state, and destroyed only
/// by the expiry sweeper. There is no distinct "consumed" terminal state; a
/// completed handshake stays readable until swept, which lets a user reload
/// the completion page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAuthRequest {
    /// Opaque unguessable correlation id; primary key of the registry.
    pub state: String,
    /// Identifier supplied by the extension instance. Untrusted; kept for
    /// display and audit only.
    pub extension_id: String,
    /// Where the extension wants control returned to. Untrusted external
    /// redirect target, never dereferenced server-side.
    pub redirect_url: Option<String>,
    /// TTL anchor. Refreshed forward on poll and on login completion,
    /// never rolled back.
    pub created_at: DateTime<Utc>,
    /// SHA-256 hex of an optional pre-shared secret. The raw secret is
    /// never stored.
    pub token_hash: Option<String>,
}

impl PendingAuthRequest {
    pub fn new(
        state: String,
        extension_id: String,
        redirect_url: Option<String>,
        token_hash: Option<String>,
    ) -> Self {
        Self {
            state,
            extension_id,
            redirect_url,
            created_at: Utc::now(),
            token_hash,
        }
    }

    /// Age of the record relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// Whether the record has outlived `ttl` at instant `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}
