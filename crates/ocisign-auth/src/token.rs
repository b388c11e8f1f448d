//! Resource principal session tokens and the key identifiers derived from them.

use std::fmt;

use crate::claims::{Claims, decode_payload};
use crate::error::SignError;

/// Prefix that marks a key identifier as a session-token reference.
pub const KEY_ID_PREFIX: &str = "ST$";

/// A raw resource principal session token (RPST).
///
/// The token is a compact `header.payload.signature` structure. It is kept
/// verbatim because the key identifier embeds it unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    raw: String,
}

impl SessionToken {
    /// Wrap a raw token, checking that it has at least three segments.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::MalformedCredential`] if the token has fewer than
    /// three dot-separated segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use ocisign_auth::SessionToken;
    ///
    /// assert!(SessionToken::parse("a.b.c").is_ok());
    /// assert!(SessionToken::parse("a.b").is_err());
    /// ```
    pub fn parse(raw: impl Into<String>) -> Result<Self, SignError> {
        let raw = raw.into();
        if raw.split('.').count() < 3 {
            return Err(SignError::MalformedCredential);
        }
        Ok(Self { raw })
    }

    /// The token exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The second (payload) segment, still base64 encoded.
    #[must_use]
    pub fn payload_segment(&self) -> &str {
        // parse() guarantees at least three segments
        self.raw.split('.').nth(1).unwrap_or_default()
    }

    /// Decode the claims carried in the payload segment.
    ///
    /// The token's own signature is not checked; the receiving service does that.
    pub fn claims(&self) -> Result<Claims, SignError> {
        decode_payload(self.payload_segment())
    }

    /// The key identifier used when signing requests with this token.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        KeyId(format!("{KEY_ID_PREFIX}{}", self.raw))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.raw.len())
    }
}

/// The `keyId` of an OCI HTTP signature: `ST$` followed by the whole session token.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyId(String);

impl KeyId {
    /// The full key identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The session token this key identifier was built from.
    #[must_use]
    pub fn session_token(&self) -> &str {
        &self.0[KEY_ID_PREFIX.len()..]
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({KEY_ID_PREFIX}<{} bytes>)", self.session_token().len())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
