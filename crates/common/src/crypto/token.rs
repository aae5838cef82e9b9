use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

/// Number of random bytes behind a session token
pub const SESSION_TOKEN_BYTES: usize = 32;

/// The operating system randomness source could not be read
#[derive(Debug, thiserror::Error)]
#[error("randomness source unavailable: {0}")]
pub struct RandomnessError(String);

/// Generate an unguessable session token.
///
/// Reads [`SESSION_TOKEN_BYTES`] bytes from the OS CSPRNG and encodes them as
/// URL-safe base64. Never returns an empty token: a failing source is an error.
pub fn random_token() -> Result<String, RandomnessError> {
    let mut buff = [0u8; SESSION_TOKEN_BYTES];
    getrandom::getrandom(&mut buff).map_err(|e| RandomnessError(e.to_string()))?;
    Ok(URL_SAFE.encode(buff))
}
