use std::fmt;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use super::error::AuthError;
use super::path_token::{PathTokenLifetime, PathTokenStore, PATH_TOKEN_LEN};
use super::session::{SessionStatus, SessionStore};
use super::SESSION_TTL;
use crate::crypto::{digest, random_token};

/// Credentials handed out by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque value for the `session_id` cookie
    pub token: String,
    /// Short token to embed in download URLs
    pub path_token: String,
    /// Timestamp both tokens were minted with
    pub issued_at: DateTime<Utc>,
}

/// Verdict on a path token presented by a download request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTokenDecision {
    /// No secret configured; proceed without further checks
    Disabled,
    Accepted,
    Rejected,
}

impl PathTokenDecision {
    pub fn is_authorized(self) -> bool {
        !matches!(self, PathTokenDecision::Rejected)
    }

    /// Human readable outcome. Empty when auth is disabled.
    pub fn message(self) -> &'static str {
        match self {
            PathTokenDecision::Disabled => "",
            PathTokenDecision::Accepted => "download token accepted",
            PathTokenDecision::Rejected => "download token was tampered with or has expired",
        }
    }
}

#[derive(Debug, Default)]
struct AuthTables {
    sessions: SessionStore,
    path_tokens: PathTokenStore,
}

/// Verifies the configured secret and the credentials derived from it.
///
/// Built once at start-up and shared by reference between request handlers.
/// Every read-modify-write against the session and path-token tables happens
/// under one lock, and that lock is never held across I/O.
pub struct Authenticator {
    secret: Option<String>,
    lifetime: PathTokenLifetime,
    ttl: Duration,
    tables: Mutex<AuthTables>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("enabled", &self.is_enabled())
            .field("lifetime", &self.lifetime)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Authenticator {
    /// An empty or missing secret disables authentication entirely.
    pub fn new(secret: Option<String>, lifetime: PathTokenLifetime) -> Self {
        let ttl = Duration::seconds(SESSION_TTL.as_secs() as i64);
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            lifetime,
            ttl,
            tables: Mutex::new(AuthTables::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn path_token_lifetime(&self) -> PathTokenLifetime {
        self.lifetime
    }

    /// Derive the download token minted alongside a session issued at `issued_at`
    pub fn derive_path_token(secret: &str, issued_at: DateTime<Utc>) -> String {
        let input = format!("{}{}", secret, issued_at.timestamp());
        digest(&input, Some(PATH_TOKEN_LEN))
    }

    /// Verify `submitted` against the configured secret and open a session.
    ///
    /// Returns `Ok(None)` when auth is disabled.
    pub fn login(
        &self,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AuthError> {
        let Some(secret) = self.secret.as_deref() else {
            tracing::warn!("login: no secret configured, authentication is disabled");
            return Ok(None);
        };

        if digest(secret, None) != digest(submitted, None) {
            tracing::error!("login: invalid secret submitted");
            return Err(AuthError::InvalidSecret);
        }

        let token = random_token().map_err(|e| {
            tracing::error!("login: failed to generate session token: {}", e);
            AuthError::from(e)
        })?;
        let path_token = Self::derive_path_token(secret, now);

        {
            let mut tables = self.tables.lock();
            tables.sessions.put(token.clone(), now);
            tables.path_tokens.register(path_token.clone(), now);
        }

        tracing::info!(issued_at = now.timestamp(), "login: secret verified, session issued");
        Ok(Some(Session {
            token,
            path_token,
            issued_at: now,
        }))
    }

    /// Look `token` up without mapping the outcome onto an error
    pub fn session_status(&self, token: &str, now: DateTime<Utc>) -> SessionStatus {
        self.tables.lock().sessions.check(token, now, self.ttl)
    }

    /// Require a live session for the cookie value `cookie`.
    ///
    /// No cookie at all is [`AuthError::Unauthenticated`]; a cookie that is
    /// unknown or past its TTL is [`AuthError::Expired`].
    pub fn require_session(
        &self,
        cookie: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        if !self.is_enabled() {
            tracing::warn!("session check: no secret configured, skipping");
            return Ok(());
        }

        let Some(token) = cookie.filter(|c| !c.is_empty()) else {
            tracing::error!("session check: no session cookie presented");
            return Err(AuthError::Unauthenticated);
        };

        match self.session_status(token, now) {
            SessionStatus::Valid => {
                tracing::debug!("session check: passed");
                Ok(())
            }
            status => {
                tracing::error!(?status, "session check: session expired or unknown");
                Err(AuthError::Expired)
            }
        }
    }

    /// Decide whether a download request carrying `token` may proceed
    pub fn check_path_token(&self, token: &str, now: DateTime<Utc>) -> PathTokenDecision {
        if !self.is_enabled() {
            tracing::warn!("path token check: no secret configured, skipping");
            return PathTokenDecision::Disabled;
        }

        let known = self
            .tables
            .lock()
            .path_tokens
            .check(token, now, self.lifetime, self.ttl);

        if known {
            tracing::info!("path token check: passed");
            PathTokenDecision::Accepted
        } else {
            tracing::error!("path token check: token tampered with or expired");
            PathTokenDecision::Rejected
        }
    }

    pub fn require_path_token(&self, token: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.check_path_token(token, now).is_authorized() {
            Ok(())
        } else {
            Err(AuthError::PathTokenRejected)
        }
    }
}
