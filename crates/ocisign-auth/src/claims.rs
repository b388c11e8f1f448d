//! Claim extraction from session token payloads.
//!
//! Extraction is a strict, total function: a payload either decodes to a JSON
//! object of claims or fails with a classified [`SignError`]. Nothing here
//! verifies the token; trust in it is established by the platform that issued it.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::SignError;
use crate::token::SessionToken;

/// Claim naming the tenancy that owns the resource principal.
pub const TENANT_CLAIM: &str = "res_tenant";
/// Claim naming the compartment of the resource.
pub const COMPARTMENT_CLAIM: &str = "res_compartment";
/// Claim naming the resource type (e.g. `fnfunc`).
pub const RESOURCE_TYPE_CLAIM: &str = "res_type";
/// Claim naming the resource OCID.
pub const RESOURCE_ID_CLAIM: &str = "res_id";
/// Expiry claim, seconds since the Unix epoch.
pub const EXPIRY_CLAIM: &str = "exp";

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose =
    GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);
const STANDARD_LENIENT: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);

/// Claims decoded from a session token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    claims: Map<String, Value>,
}

impl Claims {
    /// Look up a string-valued claim.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Look up a string-valued claim that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::MissingClaim`] if the claim is absent or not a string.
    pub fn require(&self, name: &str) -> Result<&str, SignError> {
        self.get(name).ok_or_else(|| SignError::MissingClaim(name.to_owned()))
    }

    /// The owning tenancy OCID (`res_tenant`).
    pub fn tenancy_id(&self) -> Result<&str, SignError> {
        self.require(TENANT_CLAIM)
    }

    /// The resource compartment OCID, if the token carries one.
    #[must_use]
    pub fn compartment_id(&self) -> Option<&str> {
        self.get(COMPARTMENT_CLAIM)
    }

    /// The resource type, if the token carries one.
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.get(RESOURCE_TYPE_CLAIM)
    }

    /// The resource OCID, if the token carries one.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.get(RESOURCE_ID_CLAIM)
    }

    /// Token expiry, if the token carries a numeric `exp` claim.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.claims.get(EXPIRY_CLAIM)?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }

    /// Number of claims in the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether the payload carried no claims at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Decode the claims of a raw session token.
///
/// # Errors
///
/// - [`SignError::MalformedCredential`] if the token has fewer than three segments
/// - [`SignError::ClaimDecode`] if the payload is not base64, UTF-8 or a JSON object
pub fn decode_claims(raw_token: &str) -> Result<Claims, SignError> {
    SessionToken::parse(raw_token)?.claims()
}

/// Extract the tenancy OCID from a raw session token.
///
/// # Examples
///
/// ```
/// use ocisign_auth::claims::tenancy_id;
///
/// // payload: {"res_tenant":"ocid1.tenancy.oc1..aaa"}
/// let token = "e30.eyJyZXNfdGVuYW50Ijoib2NpZDEudGVuYW5jeS5vYzEuLmFhYSJ9.sig";
/// assert_eq!(tenancy_id(token).unwrap(), "ocid1.tenancy.oc1..aaa");
/// ```
pub fn tenancy_id(raw_token: &str) -> Result<String, SignError> {
    decode_claims(raw_token)?
        .tenancy_id()
        .map(ToOwned::to_owned)
}

/// Decode a base64 payload segment into claims.
///
/// Both the URL-safe and the standard alphabet are accepted, padded or not.
pub(crate) fn decode_payload(segment: &str) -> Result<Claims, SignError> {
    let bytes = URL_SAFE_LENIENT
        .decode(segment)
        .or_else(|_| STANDARD_LENIENT.decode(segment))
        .map_err(|e| SignError::ClaimDecode(format!("payload is not base64: {e}")))?;

    let text = String::from_utf8(bytes)
        .map_err(|e| SignError::ClaimDecode(format!("payload is not UTF-8: {e}")))?;

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(claims)) => Ok(Claims { claims }),
        Ok(_) => Err(SignError::ClaimDecode(
            "payload is not a JSON object".to_owned(),
        )),
        Err(e) => Err(SignError::ClaimDecode(format!("payload is not JSON: {e}"))),
    }
}
