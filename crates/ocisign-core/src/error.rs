//! Error types for the ocisign core.

/// Core error type for ocisign infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum OciSignError {
    /// Invalid OCI region identifier.
    #[error("invalid OCI region: {0:?}")]
    InvalidRegion(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for ocisign operations.
pub type OciSignResult<T> = Result<T, OciSignError>;
