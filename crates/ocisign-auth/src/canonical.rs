//! Signing string construction.
//!
//! The signing string is one `"<name>: <value>"` line per signed header, in
//! header-set order, joined with `\n` and without a trailing newline:
//!
//! ```text
//! host: objectstorage.us-phoenix-1.oraclecloud.com
//! date: Thu, 05 Jan 2014 21:31:40 GMT
//! (request-target): get /n/ns1/b/?compartmentId=ocid1.compartment.oc1..bbb
//! ```
//!
//! The verifier rebuilds this string byte for byte, so names are always
//! lowercase and exactly one space follows each colon.

use std::collections::BTreeMap;

use crate::error::SignError;
use crate::headers::{SigningHeader, SigningMethod};

/// Values of the headers that may be signed, keyed by header.
pub type HeaderValues = BTreeMap<SigningHeader, String>;

/// Format the `(request-target)` value: lowercase method, a space, then the
/// path with its query string as sent.
///
/// # Examples
///
/// ```
/// use ocisign_auth::canonical::request_target;
/// use ocisign_auth::headers::SigningMethod;
///
/// assert_eq!(
///     request_target(SigningMethod::Get, "/n/ns1/b/?limit=10"),
///     "get /n/ns1/b/?limit=10"
/// );
/// ```
#[must_use]
pub fn request_target(method: SigningMethod, path: &str) -> String {
    format!("{} {path}", method.as_str().to_ascii_lowercase())
}

/// Build the signing string for `headers` from `values`.
///
/// # Errors
///
/// - [`SignError::MissingHeader`] if a header in `headers` has no value
/// - [`SignError::InvalidHeaderValue`] if a value contains a line break
pub fn build_signing_string(
    headers: &[SigningHeader],
    values: &HeaderValues,
) -> Result<String, SignError> {
    let mut lines = Vec::with_capacity(headers.len());

    for header in headers {
        let value = values
            .get(header)
            .ok_or_else(|| SignError::MissingHeader(header.as_str().to_owned()))?;
        if value.contains(['\n', '\r']) {
            return Err(SignError::InvalidHeaderValue(header.as_str().to_owned()));
        }
        lines.push(format!("{}: {value}", header.as_str()));
    }

    Ok(lines.join("\n"))
}
