//! Session and download authorization
//!
//! A single configured secret gates the whole server. Logging in with it
//! yields two credentials minted from the same timestamp:
//!
//! - a **session token**, carried in the `session_id` cookie and valid for
//!   [`SESSION_TTL`] after issue;
//! - a **path token**, the first 8 hex characters of
//!   `digest(secret + issue_unix_seconds)`, embedded in download URLs so a
//!   link works without any cookie.
//!
//! Both tables live behind one lock owned by the [`Authenticator`]. When no
//! secret is configured every check passes.

mod authenticator;
mod error;
mod path_token;
mod session;

use std::time::Duration;

pub use authenticator::{Authenticator, PathTokenDecision, Session};
pub use error::AuthError;
pub use path_token::{PathTokenLifetime, PathTokenStore, PATH_TOKEN_LEN};
pub use session::{SessionStatus, SessionStore};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// How long a session stays valid after it was issued
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);
