//! RSA-SHA256 signatures over signing strings.
//!
//! Signatures are RSASSA-PKCS1-v1_5 with SHA-256, base64 encoded. PKCS#1 v1.5
//! is deterministic, so the same key and signing string always give the same
//! signature.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::SignError;

/// Algorithm name advertised in the `Authorization` header.
pub const ALGORITHM: &str = "rsa-sha256";

/// Signs signing strings with an RSA private key.
#[derive(Clone)]
pub struct RsaSigner {
    signing_key: SigningKey<Sha256>,
    public_key: RsaPublicKey,
}

impl RsaSigner {
    /// Load a signer from a PEM private key.
    ///
    /// Both PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`)
    /// encodings are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Signing`] if the PEM cannot be parsed as an RSA key.
    pub fn from_pem(pem: &str) -> Result<Self, SignError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem).or_else(|pkcs8_err| {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                SignError::Signing(format!(
                    "unreadable private key (pkcs8: {pkcs8_err}; pkcs1: {pkcs1_err})"
                ))
            })
        })?;
        Ok(Self::new(private_key))
    }

    /// Create a signer from an already parsed key.
    #[must_use]
    pub fn new(private_key: RsaPrivateKey) -> Self {
        let public_key = private_key.to_public_key();
        Self {
            signing_key: SigningKey::<Sha256>::new(private_key),
            public_key,
        }
    }

    /// Sign `signing_string` and return the base64 signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Signing`] if the RSA operation fails.
    pub fn sign(&self, signing_string: &str) -> Result<String, SignError> {
        let signature = self
            .signing_key
            .try_sign(signing_string.as_bytes())
            .map_err(|e| SignError::Signing(e.to_string()))?;
        Ok(BASE64.encode(signature.to_bytes()))
    }

    /// The public half of the signing key.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

impl fmt::Debug for RsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSigner")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

/// Parse a PEM public key (`BEGIN PUBLIC KEY`).
///
/// # Errors
///
/// Returns [`SignError::Signing`] if the PEM is not an RSA public key.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey, SignError> {
    RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| SignError::Signing(format!("unreadable public key: {e}")))
}

/// Check a base64 signature over `signing_string` against `public_key`.
///
/// # Errors
///
/// Returns [`SignError::Signing`] if the signature is not valid base64, not a
/// well-formed RSA signature, or does not match.
pub fn verify(
    signing_string: &str,
    signature_b64: &str,
    public_key: &RsaPublicKey,
) -> Result<(), SignError> {
    let bytes = BASE64
        .decode(signature_b64)
        .map_err(|e| SignError::Signing(format!("signature is not base64: {e}")))?;
    let signature = Signature::try_from(bytes.as_slice())
        .map_err(|e| SignError::Signing(e.to_string()))?;
    VerifyingKey::<Sha256>::new(public_key.clone())
        .verify(signing_string.as_bytes(), &signature)
        .map_err(|e| SignError::Signing(format!("signature does not match: {e}")))
}
