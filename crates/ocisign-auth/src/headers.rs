//! Signing method and header-set selection.
//!
//! Every request signs `host`, `date` and `(request-target)`. Methods that carry
//! a payload additionally sign `content-type`, `content-length` and
//! `x-content-sha256`, even when the payload is empty.

use std::fmt;
use std::str::FromStr;

use http::Method;

use crate::error::SignError;

/// Name of the body digest header.
pub const CONTENT_SHA256_HEADER: &str = "x-content-sha256";

/// Name of the pseudo-header covering the method and path.
pub const REQUEST_TARGET: &str = "(request-target)";

/// HTTP methods this signer knows how to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningMethod {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl SigningMethod {
    /// The uppercase method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }

    /// Whether requests with this method sign the body headers.
    #[must_use]
    pub fn requires_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningMethod {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            _ => Err(SignError::UnsupportedMethod(s.to_owned())),
        }
    }
}

impl TryFrom<&Method> for SigningMethod {
    type Error = SignError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(Self::Get),
            Method::HEAD => Ok(Self::Head),
            Method::DELETE => Ok(Self::Delete),
            Method::OPTIONS => Ok(Self::Options),
            Method::POST => Ok(Self::Post),
            Method::PUT => Ok(Self::Put),
            // extension methods arrive case-preserved, e.g. "get"
            _ => method.as_str().parse(),
        }
    }
}

/// A header participating in the signing string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SigningHeader {
    /// `host`
    Host,
    /// `date`
    Date,
    /// `(request-target)`
    RequestTarget,
    /// `content-type`
    ContentType,
    /// `content-length`
    ContentLength,
    /// `x-content-sha256`
    ContentSha256,
}

impl SigningHeader {
    /// The lowercase name used in both the signing string and `headers="..."`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Date => "date",
            Self::RequestTarget => REQUEST_TARGET,
            Self::ContentType => "content-type",
            Self::ContentLength => "content-length",
            Self::ContentSha256 => CONTENT_SHA256_HEADER,
        }
    }
}

impl fmt::Display for SigningHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BASE_HEADERS: [SigningHeader; 3] = [
    SigningHeader::Host,
    SigningHeader::Date,
    SigningHeader::RequestTarget,
];

const BODY_HEADERS: [SigningHeader; 6] = [
    SigningHeader::Host,
    SigningHeader::Date,
    SigningHeader::RequestTarget,
    SigningHeader::ContentType,
    SigningHeader::ContentLength,
    SigningHeader::ContentSha256,
];

/// The ordered set of headers to sign for `method`.
///
/// # Examples
///
/// ```
/// use ocisign_auth::headers::{SigningMethod, header_list, signing_headers};
///
/// assert_eq!(
///     header_list(signing_headers(SigningMethod::Get)),
///     "host date (request-target)"
/// );
/// ```
#[must_use]
pub fn signing_headers(method: SigningMethod) -> &'static [SigningHeader] {
    if method.requires_body() {
        &BODY_HEADERS
    } else {
        &BASE_HEADERS
    }
}

/// Join header names with single spaces, as the `headers` parameter expects.
#[must_use]
pub fn header_list(headers: &[SigningHeader]) -> String {
    headers
        .iter()
        .map(SigningHeader::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
