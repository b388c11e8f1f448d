//! Verification of signed requests.
//!
//! The receiving side of [`crate::signer`]: rebuild the signing string from the
//! headers named in the `Authorization` header, check the body digest, and
//! verify the RSA signature with the caller's public key. Object Storage does
//! this server-side; here it backs local test servers.

use http::header::{AUTHORIZATION, HOST};
use rsa::RsaPublicKey;
use tracing::debug;

use crate::digest::hash_body;
use crate::error::SignError;
use crate::headers::{CONTENT_SHA256_HEADER, REQUEST_TARGET};
use crate::signature::{ALGORITHM, verify};
use crate::signer::{AuthorizationParams, SIGNATURE_VERSION, parse_authorization};

/// Verify a request signed by [`crate::RequestSigner`].
///
/// Returns the parsed `Authorization` parameters on success.
///
/// # Errors
///
/// - [`SignError::MissingHeader`] if the `Authorization` header or a signed header is missing
/// - [`SignError::InvalidAuthHeader`] if the header is malformed, or the version or algorithm differs
/// - [`SignError::Signing`] if the body digest or the signature does not match
pub fn verify_request(
    parts: &http::request::Parts,
    body: &[u8],
    public_key: &RsaPublicKey,
) -> Result<AuthorizationParams, SignError> {
    let auth_header = header_value(parts, AUTHORIZATION.as_str())?;
    let params = parse_authorization(auth_header)?;

    if params.version.as_deref() != Some(SIGNATURE_VERSION) || params.algorithm != ALGORITHM {
        return Err(SignError::InvalidAuthHeader);
    }

    if let Some(claimed) = parts.headers.get(CONTENT_SHA256_HEADER) {
        if claimed.as_bytes() != hash_body(body).as_bytes() {
            return Err(SignError::Signing("body digest does not match".to_owned()));
        }
    }

    let mut lines = Vec::with_capacity(params.headers.len());
    for name in &params.headers {
        let value = match name.as_str() {
            REQUEST_TARGET => {
                let path = parts.uri.path_and_query().map_or("/", |p| p.as_str());
                format!("{} {path}", parts.method.as_str().to_ascii_lowercase())
            }
            "host" if !parts.headers.contains_key(HOST) => parts
                .uri
                .authority()
                .ok_or_else(|| SignError::MissingHeader(name.clone()))?
                .to_string(),
            other => header_value(parts, other)?.to_owned(),
        };
        lines.push(format!("{name}: {value}"));
    }
    let signing_string = lines.join("\n");

    debug!(signing_string, "Rebuilt signing string");

    verify(&signing_string, &params.signature, public_key)?;
    Ok(params)
}

fn header_value<'a>(parts: &'a http::request::Parts, name: &str) -> Result<&'a str, SignError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| SignError::MissingHeader(name.to_owned()))?
        .to_str()
        .map_err(|_| SignError::InvalidHeaderValue(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use http::header::DATE;
    use http::{HeaderValue, Method};

    use super::*;
    use crate::credentials::Credentials;
    use crate::signature::public_key_from_pem;
    use crate::signer::{RequestSigner, SigningRequest};

    const TEST_KEY: &str = include_str!("../tests/fixtures/test_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/test_key_pub.pem");
    const TOKEN: &str = include_str!("../tests/fixtures/session_token.txt");
    const HOST_NAME: &str = "objectstorage.us-phoenix-1.oraclecloud.com";
    const TEST_DATE: &str = "Thu, 05 Jan 2014 21:31:40 GMT";

    fn signed_parts(method: Method, path: &str, body: &'static [u8]) -> http::request::Parts {
        let signer = RequestSigner::from_credentials(&Credentials::new(TOKEN, TEST_KEY)).unwrap();
        let request = SigningRequest::new(method.clone(), HOST_NAME, path)
            .with_header(DATE, HeaderValue::from_static(TEST_DATE))
            .with_body(body);
        let signed = signer.sign(&request).unwrap();

        let (mut parts, ()) = http::Request::builder()
            .method(method)
            .uri(format!("https://{HOST_NAME}{path}"))
            .header(HOST, HOST_NAME)
            .header(DATE, TEST_DATE)
            .body(())
            .unwrap()
            .into_parts();
        signed.merge_into(&mut parts.headers);
        parts
    }

    #[test]
    fn test_should_verify_signed_get() {
        let parts = signed_parts(Method::GET, "/n/ns1/b/?compartmentId=c1", b"");
        let public_key = public_key_from_pem(TEST_PUBLIC_KEY).unwrap();
        let params = verify_request(&parts, b"", &public_key).unwrap();
        assert_eq!(params.key_id, format!("ST${TOKEN}"));
    }

    #[test]
    fn test_should_verify_signed_put() {
        let parts = signed_parts(Method::PUT, "/n/ns1/b/b1/o/o1", b"object data");
        let public_key = public_key_from_pem(TEST_PUBLIC_KEY).unwrap();
        assert!(verify_request(&parts, b"object data", &public_key).is_ok());
    }

    #[test]
    fn test_should_reject_tampered_body() {
        let parts = signed_parts(Method::PUT, "/n/ns1/b/b1/o/o1", b"object data");
        let public_key = public_key_from_pem(TEST_PUBLIC_KEY).unwrap();
        assert!(matches!(
            verify_request(&parts, b"object datb", &public_key),
            Err(SignError::Signing(_))
        ));
    }

    #[test]
    fn test_should_reject_changed_date() {
        let mut parts = signed_parts(Method::GET, "/n/ns1/b/", b"");
        parts.headers.insert(
            DATE,
            HeaderValue::from_static("Fri, 06 Jan 2014 21:31:40 GMT"),
        );
        let public_key = public_key_from_pem(TEST_PUBLIC_KEY).unwrap();
        assert!(matches!(
            verify_request(&parts, b"", &public_key),
            Err(SignError::Signing(_))
        ));
    }

    #[test]
    fn test_should_reject_missing_authorization() {
        let (parts, ()) = http::Request::builder()
            .uri("https://example.com/")
            .body(())
            .unwrap()
            .into_parts();
        let public_key = public_key_from_pem(TEST_PUBLIC_KEY).unwrap();
        assert!(matches!(
            verify_request(&parts, b"", &public_key),
            Err(SignError::MissingHeader(name)) if name == "authorization"
        ));
    }
}
