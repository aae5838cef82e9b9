use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Outcome of looking a session token up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Issued less than one TTL ago
    Valid,
    /// Known but past its TTL; the entry has been removed
    Expired,
    /// Never issued, or already purged
    Unknown,
}

/// Session tokens mapped to their issue time.
///
/// Not synchronized on its own: the [`Authenticator`](super::Authenticator)
/// keeps it behind the same lock as the path-token table.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, DateTime<Utc>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the issue time of `token`
    pub fn put(&mut self, token: String, issued_at: DateTime<Utc>) {
        self.sessions.insert(token, issued_at);
    }

    /// Check `token` against `now`, purging it if it has expired.
    ///
    /// A session is valid while `issued_at + ttl > now`. Expiry is lazy: stale
    /// entries are only dropped when someone presents them.
    pub fn check(&mut self, token: &str, now: DateTime<Utc>, ttl: Duration) -> SessionStatus {
        let Some(issued_at) = self.sessions.get(token).copied() else {
            return SessionStatus::Unknown;
        };

        if issued_at + ttl <= now {
            self.sessions.remove(token);
            return SessionStatus::Expired;
        }

        SessionStatus::Valid
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
