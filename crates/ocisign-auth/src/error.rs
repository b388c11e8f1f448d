//! Error types for request signing.
//!
//! All signing failures are represented by [`SignError`]. Every variant is
//! final for the request at hand: retrying without fixing the credential or
//! the request fails the same way again.

/// Errors that can occur while interpreting credentials or signing a request.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The session token does not have three dot-separated segments.
    #[error("Malformed session token: expected three dot-separated segments")]
    MalformedCredential,

    /// The token payload is not valid base64, UTF-8, or a JSON object.
    #[error("Failed to decode session token claims: {0}")]
    ClaimDecode(String),

    /// A required claim is absent from the decoded token payload.
    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// The private key could not be parsed or the signature operation failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The HTTP method is outside the set this signer knows how to sign.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// A header that must be signed has no value on the request.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// A header value is not representable as visible ASCII.
    #[error("Invalid value for header: {0}")]
    InvalidHeaderValue(String),

    /// An `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// Credential material could not be read from its backing store.
    #[error("Credential unavailable: {what}")]
    CredentialUnavailable {
        /// Which credential was being loaded.
        what: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
