/**
 * Archive construction for folder downloads.
 *  Walks a directory subtree and streams it
 *  into a single deflated zip file.
 */
pub mod archive;
/**
 * Session and download authorization.
 *  - Session tokens with a fixed TTL
 *  - Secret-derived path tokens for download links
 */
pub mod auth;
/**
 * Hashing and random token generation used
 *  by the auth layer.
 */
pub mod crypto;
/**
 * Helper for reporting build version information
 *  captured at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::archive::{build_archive, ArchiveBuilder, ArchiveError, TempArchive};
    pub use crate::auth::{
        AuthError, Authenticator, PathTokenDecision, PathTokenLifetime, Session, SESSION_TTL,
    };
    pub use crate::version::build_info;
}
