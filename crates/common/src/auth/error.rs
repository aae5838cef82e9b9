use crate::crypto::RandomnessError;

/// Reasons a request fails authentication.
///
/// A disabled auth layer is not an error; it surfaces as `Ok(None)` from
/// [`Authenticator::login`](super::Authenticator::login) and as
/// [`PathTokenDecision::Disabled`](super::PathTokenDecision::Disabled).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("not authenticated, please log in first")]
    Unauthenticated,
    #[error("session expired, please log in again")]
    Expired,
    #[error("invalid secret")]
    InvalidSecret,
    #[error("download token was tampered with or has expired")]
    PathTokenRejected,
    #[error(transparent)]
    RandomnessUnavailable(#[from] RandomnessError),
}
