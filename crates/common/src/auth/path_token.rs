use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of hex characters kept from the digest when deriving a path token
pub const PATH_TOKEN_LEN: usize = 8;

/// How long a registered path token stays usable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathTokenLifetime {
    /// Valid until the process exits, even after its session expired
    #[default]
    Process,
    /// Expires together with the session it was minted with
    Session,
}

impl fmt::Display for PathTokenLifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathTokenLifetime::Process => write!(f, "process"),
            PathTokenLifetime::Session => write!(f, "session"),
        }
    }
}

impl FromStr for PathTokenLifetime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "process" => Ok(PathTokenLifetime::Process),
            "session" => Ok(PathTokenLifetime::Session),
            other => Err(format!(
                "unknown path token lifetime '{}', expected 'process' or 'session'",
                other
            )),
        }
    }
}

/// Registered path tokens mapped to the issue time of their session
#[derive(Debug, Default)]
pub struct PathTokenStore {
    tokens: HashMap<String, DateTime<Utc>>,
}

impl PathTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, token: String, issued_at: DateTime<Utc>) {
        self.tokens.insert(token, issued_at);
    }

    /// Whether `token` is currently registered.
    ///
    /// Under [`PathTokenLifetime::Session`] a token older than `ttl` is
    /// evicted and reported as unknown.
    pub fn check(
        &mut self,
        token: &str,
        now: DateTime<Utc>,
        lifetime: PathTokenLifetime,
        ttl: Duration,
    ) -> bool {
        let Some(issued_at) = self.tokens.get(token).copied() else {
            return false;
        };

        match lifetime {
            PathTokenLifetime::Process => true,
            PathTokenLifetime::Session if issued_at + ttl <= now => {
                self.tokens.remove(token);
                false
            }
            PathTokenLifetime::Session => true,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
