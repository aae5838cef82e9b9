//! Hashing and token primitives for the auth layer
//!
//! - **Digests**: unsalted SHA-256, hex-encoded, optionally truncated. The same
//!   input always yields the same digest, which is what lets a path token be
//!   re-derived from `(secret, issue time)`.
//! - **Session tokens**: 32 bytes from the operating system CSPRNG, encoded as
//!   URL-safe base64 so they can travel in a cookie unmodified.

mod digest;
mod token;

pub use digest::{digest, DIGEST_HEX_LEN};
pub use token::{random_token, RandomnessError, SESSION_TOKEN_BYTES};
