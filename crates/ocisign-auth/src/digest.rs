//! Body digest computation for the `x-content-sha256` header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};

/// `x-content-sha256` value of an empty body.
pub const EMPTY_BODY_SHA256: &str = "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";

/// Digest and length of a request body, as they will be transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDigest {
    sha256: String,
    content_length: usize,
}

impl BodyDigest {
    /// Compute the digest of `body`. An absent body is the empty slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use ocisign_auth::digest::{BodyDigest, EMPTY_BODY_SHA256};
    ///
    /// let digest = BodyDigest::compute(b"");
    /// assert_eq!(digest.sha256(), EMPTY_BODY_SHA256);
    /// assert_eq!(digest.content_length(), 0);
    /// ```
    #[must_use]
    pub fn compute(body: &[u8]) -> Self {
        Self {
            sha256: hash_body(body),
            content_length: body.len(),
        }
    }

    /// Base64 SHA-256 of the body.
    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Exact body length in bytes.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.content_length
    }
}

/// Base64-encoded SHA-256 of `body`.
#[must_use]
pub fn hash_body(body: &[u8]) -> String {
    BASE64.encode(Sha256::digest(body))
}
