use sha2::{Digest, Sha256};

/// Length of a full hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash `input` with SHA-256 and hex-encode the result.
///
/// When `len` is `Some`, the hex string is cut down to that many characters
/// (a length past the full digest returns the full digest). `None` returns all
/// [`DIGEST_HEX_LEN`] characters.
pub fn digest(input: &str, len: Option<usize>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let mut encoded = hex::encode(hasher.finalize());

    if let Some(len) = len {
        encoded.truncate(len);
    }
    encoded
}
