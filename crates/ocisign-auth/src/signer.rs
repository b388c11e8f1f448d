//! OCI request signing.
//!
//! This module ties the pieces together:
//!
//! 1. Resolve the [`SigningMethod`] and its header set.
//! 2. For `POST` and `PUT`, compute the body digest and finalize
//!    `content-type`, `content-length` and `x-content-sha256`.
//! 3. Build the signing string from `host`, `date`, `(request-target)` and the
//!    finalized body headers.
//! 4. Sign it with the RSA key and format the `Authorization` header.
//!
//! The signer never touches the caller's request. It returns [`SignedHeaders`],
//! an immutable set of headers to merge into the outgoing request.
//!
//! The main entry point is [`RequestSigner::sign`].

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HOST};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use tracing::debug;

use crate::canonical::{HeaderValues, build_signing_string, request_target};
use crate::credentials::Credentials;
use crate::date::http_date;
use crate::digest::BodyDigest;
use crate::error::SignError;
use crate::headers::{
    CONTENT_SHA256_HEADER, SigningHeader, SigningMethod, header_list, signing_headers,
};
use crate::signature::{ALGORITHM, RsaSigner};
use crate::token::{KeyId, SessionToken};

/// Signature scheme version this API family expects.
pub const SIGNATURE_VERSION: &str = "1";

/// `content-type` used for bodied requests that do not set one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// An outbound request to be signed.
///
/// `date` must be set (see [`SigningRequest::with_date`]) before signing; the
/// signer does not read the clock so that signing stays deterministic.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    method: Method,
    host: String,
    path: String,
    body: Option<Bytes>,
    headers: HeaderMap,
}

impl SigningRequest {
    /// Create a request for `method` against `host` and `path`.
    ///
    /// `path` includes the query string and must already be percent-encoded.
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Create a request from an absolute URI.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::MissingHeader`] if the URI has no authority to use as `host`.
    pub fn from_uri(method: Method, uri: &Uri) -> Result<Self, SignError> {
        let host = uri
            .authority()
            .ok_or_else(|| SignError::MissingHeader(HOST.as_str().to_owned()))?
            .as_str();
        let path = uri.path_and_query().map_or("/", |p| p.as_str());
        Ok(Self::new(method, host, path))
    }

    /// Create a request from `http` request parts and an optional body.
    ///
    /// The `host` header wins over the URI authority when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::MissingHeader`] if neither a `host` header nor a URI
    /// authority is available.
    pub fn from_parts(
        parts: &http::request::Parts,
        body: Option<Bytes>,
    ) -> Result<Self, SignError> {
        let host = match parts.headers.get(HOST) {
            Some(value) => value
                .to_str()
                .map_err(|_| SignError::InvalidHeaderValue(HOST.as_str().to_owned()))?
                .to_owned(),
            None => parts
                .uri
                .authority()
                .ok_or_else(|| SignError::MissingHeader(HOST.as_str().to_owned()))?
                .as_str()
                .to_owned(),
        };
        let path = parts.uri.path_and_query().map_or("/", |p| p.as_str());

        Ok(Self {
            method: parts.method.clone(),
            host,
            path: path.to_owned(),
            body,
            headers: parts.headers.clone(),
        })
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the `date` header from `time`.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidHeaderValue`] if the formatted date is not a
    /// valid header value.
    pub fn with_date(self, time: DateTime<Utc>) -> Result<Self, SignError> {
        let value = HeaderValue::try_from(http_date(time))
            .map_err(|_| SignError::InvalidHeaderValue(DATE.as_str().to_owned()))?;
        Ok(self.with_header(DATE, value))
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The target host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The path with query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Headers set by the caller.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn header_str(&self, name: &HeaderName) -> Result<Option<&str>, SignError> {
        self.headers
            .get(name)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| SignError::InvalidHeaderValue(name.as_str().to_owned()))
            })
            .transpose()
    }
}

/// Headers produced by signing, ready to merge into the outgoing request.
///
/// Always contains `authorization`; for `POST` and `PUT` also `content-type`,
/// `content-length` and `x-content-sha256`.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    headers: HeaderMap,
    signed: &'static [SigningHeader],
}

impl SignedHeaders {
    /// The `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> &str {
        self.get(AUTHORIZATION.as_str()).unwrap_or_default()
    }

    /// Look up one of the produced headers.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The headers covered by the signature, in signing order.
    #[must_use]
    pub fn signed_headers(&self) -> &'static [SigningHeader] {
        self.signed
    }

    /// All produced headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Insert the produced headers into `target`, replacing existing values.
    pub fn merge_into(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    /// Consume into the underlying header map.
    #[must_use]
    pub fn into_header_map(self) -> HeaderMap {
        self.headers
    }
}

/// Signs requests on behalf of one session token and private key.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    key_id: KeyId,
    signer: RsaSigner,
}

impl RequestSigner {
    /// Create a signer from a key identifier and RSA key.
    #[must_use]
    pub fn new(key_id: KeyId, signer: RsaSigner) -> Self {
        Self { key_id, signer }
    }

    /// Create a signer from resource principal credentials.
    ///
    /// # Errors
    ///
    /// - [`SignError::MalformedCredential`] if the session token is malformed
    /// - [`SignError::Signing`] if the private key cannot be parsed
    pub fn from_credentials(credentials: &Credentials) -> Result<Self, SignError> {
        let token = SessionToken::parse(credentials.session_token())?;
        let signer = RsaSigner::from_pem(credentials.private_key_pem())?;
        Ok(Self::new(token.key_id(), signer))
    }

    /// The key identifier placed in every `Authorization` header.
    #[must_use]
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// Sign `request`.
    ///
    /// # Errors
    ///
    /// - [`SignError::UnsupportedMethod`] for methods outside the signable set
    /// - [`SignError::MissingHeader`] if `date` or the host is missing
    /// - [`SignError::InvalidHeaderValue`] if a value cannot be sent as a header
    /// - [`SignError::Signing`] if the RSA operation fails
    pub fn sign(&self, request: &SigningRequest) -> Result<SignedHeaders, SignError> {
        let method = SigningMethod::try_from(request.method())?;
        let headers = signing_headers(method);

        if request.host().is_empty() {
            return Err(SignError::MissingHeader(HOST.as_str().to_owned()));
        }
        let date = request
            .header_str(&DATE)?
            .ok_or_else(|| SignError::MissingHeader(DATE.as_str().to_owned()))?;

        let mut output = HeaderMap::new();
        let mut values = HeaderValues::from([
            (SigningHeader::Host, request.host().to_owned()),
            (SigningHeader::Date, date.to_owned()),
            (
                SigningHeader::RequestTarget,
                request_target(method, request.path()),
            ),
        ]);

        if method.requires_body() {
            let digest = BodyDigest::compute(request.body().map_or(&[][..], |b| &b[..]));
            let content_type = request
                .header_str(&CONTENT_TYPE)?
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_owned();
            let content_length = digest.content_length().to_string();

            insert(&mut output, CONTENT_TYPE, &content_type)?;
            insert(&mut output, CONTENT_LENGTH, &content_length)?;
            insert(
                &mut output,
                HeaderName::from_static(CONTENT_SHA256_HEADER),
                digest.sha256(),
            )?;

            values.insert(SigningHeader::ContentType, content_type);
            values.insert(SigningHeader::ContentLength, content_length);
            values.insert(SigningHeader::ContentSha256, digest.sha256().to_owned());
        }

        let signing_string = build_signing_string(headers, &values)?;
        debug!(signing_string, "Built signing string");

        let signature = self.signer.sign(&signing_string)?;
        let authorization = format_authorization(&self.key_id, headers, &signature);
        insert(&mut output, AUTHORIZATION, &authorization)?;

        debug!(
            method = %method,
            host = %request.host(),
            signed_headers = %header_list(headers),
            "Signed request"
        );

        Ok(SignedHeaders {
            headers: output,
            signed: headers,
        })
    }
}

/// Format the `Authorization` header value.
///
/// ```text
/// Signature version="1",keyId="ST$<token>",algorithm="rsa-sha256",headers="host date (request-target)",signature="<base64>"
/// ```
#[must_use]
pub fn format_authorization(key_id: &KeyId, headers: &[SigningHeader], signature: &str) -> String {
    format!(
        "Signature version=\"{SIGNATURE_VERSION}\",keyId=\"{key_id}\",algorithm=\"{ALGORITHM}\",headers=\"{}\",signature=\"{signature}\"",
        header_list(headers)
    )
}

/// Parsed parameters of a `Signature` `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationParams {
    /// The `version` parameter, if present.
    pub version: Option<String>,
    /// The `keyId` parameter.
    pub key_id: String,
    /// The `algorithm` parameter.
    pub algorithm: String,
    /// The signed header names, in order.
    pub headers: Vec<String>,
    /// The base64 signature.
    pub signature: String,
}

/// Parse a `Signature ...` `Authorization` header value.
///
/// # Errors
///
/// Returns [`SignError::InvalidAuthHeader`] if the scheme is not `Signature`,
/// a parameter is not a quoted `name="value"` pair, or `keyId`, `algorithm`,
/// `headers` or `signature` is missing.
pub fn parse_authorization(header: &str) -> Result<AuthorizationParams, SignError> {
    let mut rest = header
        .strip_prefix("Signature ")
        .ok_or(SignError::InvalidAuthHeader)?;

    let mut version = None;
    let mut key_id = None;
    let mut algorithm = None;
    let mut headers = None;
    let mut signature = None;

    while !rest.is_empty() {
        let (name, after_name) = rest.split_once("=\"").ok_or(SignError::InvalidAuthHeader)?;
        let (value, after_value) = after_name
            .split_once('"')
            .ok_or(SignError::InvalidAuthHeader)?;

        let slot = match name.trim() {
            "version" => &mut version,
            "keyId" => &mut key_id,
            "algorithm" => &mut algorithm,
            "headers" => &mut headers,
            "signature" => &mut signature,
            _ => return Err(SignError::InvalidAuthHeader),
        };
        *slot = Some(value.to_owned());

        rest = match after_value.strip_prefix(',') {
            Some(next) => next,
            None if after_value.is_empty() => after_value,
            None => return Err(SignError::InvalidAuthHeader),
        };
    }

    Ok(AuthorizationParams {
        version,
        key_id: key_id.ok_or(SignError::InvalidAuthHeader)?,
        algorithm: algorithm.ok_or(SignError::InvalidAuthHeader)?,
        headers: headers
            .ok_or(SignError::InvalidAuthHeader)?
            .split(' ')
            .map(ToOwned::to_owned)
            .collect(),
        signature: signature.ok_or(SignError::InvalidAuthHeader)?,
    })
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), SignError> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| SignError::InvalidHeaderValue(name.as_str().to_owned()))?;
    headers.insert(name, value);
    Ok(())
}
