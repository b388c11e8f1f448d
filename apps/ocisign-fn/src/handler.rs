//! Object Storage requests issued by the function.
//!
//! Requests are prepared (URL, signed headers, body) synchronously and only
//! then handed to the HTTP client, so signing never overlaps with I/O.

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::DATE;
use http::{HeaderMap, HeaderValue, Method, Uri};
use ocisign_auth::date::http_date;
use ocisign_auth::{RequestSigner, SigningRequest};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::{debug, info};

/// Characters left unescaped in a path or query component: RFC 3986 unreserved
/// plus `!*'()`, the same set JavaScript's `encodeURIComponent` keeps.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Invocation payload for listing buckets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsInput {
    /// Object Storage namespace.
    pub namespace: String,
    /// Compartment whose buckets are listed.
    pub compartment_id: String,
}

/// Percent-encode a single path segment or query value.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE_SET).to_string()
}

/// Path and query of the ListBuckets call.
#[must_use]
pub fn list_buckets_path(input: &ListBucketsInput) -> String {
    format!(
        "/n/{}/b/?compartmentId={}",
        encode_component(&input.namespace),
        encode_component(&input.compartment_id)
    )
}

/// A signed request ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// `date` plus the headers produced by signing.
    pub headers: HeaderMap,
    /// Request body, empty for read methods.
    pub body: Bytes,
}

/// Object Storage client that signs every request with resource principal credentials.
#[derive(Debug, Clone)]
pub struct ObjectStorageClient {
    http: reqwest::Client,
    endpoint: String,
    host: String,
    signer: RequestSigner,
}

impl ObjectStorageClient {
    /// Create a client for `endpoint` (e.g. `https://objectstorage.us-phoenix-1.oraclecloud.com`).
    pub fn new(endpoint: &str, signer: RequestSigner) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let uri: Uri = endpoint
            .parse()
            .with_context(|| format!("invalid Object Storage endpoint: {endpoint}"))?;
        let host = uri
            .authority()
            .with_context(|| format!("Object Storage endpoint has no host: {endpoint}"))?
            .to_string();

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_owned(),
            host,
            signer,
        })
    }

    /// Sign a request for `path` at time `now`.
    pub fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
        now: DateTime<Utc>,
    ) -> Result<PreparedRequest> {
        let date = HeaderValue::try_from(http_date(now)).context("formatting date header")?;

        let mut request = SigningRequest::new(method.clone(), self.host.as_str(), path)
            .with_header(DATE, date.clone());
        if let Some(body) = body.clone() {
            request = request.with_body(body);
        }

        let signed = self
            .signer
            .sign(&request)
            .with_context(|| format!("signing {method} {path}"))?;

        let mut headers = HeaderMap::new();
        headers.insert(DATE, date);
        signed.merge_into(&mut headers);

        Ok(PreparedRequest {
            method,
            url: format!("{}{path}", self.endpoint),
            headers,
            body: body.unwrap_or_default(),
        })
    }

    /// Send a prepared request and parse the JSON response.
    pub async fn send(&self, prepared: PreparedRequest) -> Result<serde_json::Value> {
        debug!(method = %prepared.method, url = %prepared.url, "Sending signed request");

        let mut builder = self
            .http
            .request(prepared.method.clone(), &prepared.url)
            .headers(prepared.headers);
        if !prepared.body.is_empty() {
            builder = builder.body(prepared.body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("sending {} {}", prepared.method, prepared.url))?;

        let status = response.status();
        let text = response.text().await.context("reading response body")?;
        if !status.is_success() {
            bail!("Object Storage returned {status}: {text}");
        }

        serde_json::from_str(&text).context("parsing Object Storage response as JSON")
    }

    /// List the buckets of a compartment.
    pub async fn list_buckets(&self, input: &ListBucketsInput) -> Result<serde_json::Value> {
        info!(
            namespace = %input.namespace,
            compartment_id = %input.compartment_id,
            "Listing buckets"
        );
        let prepared = self.prepare(Method::GET, &list_buckets_path(input), None, Utc::now())?;
        self.send(prepared).await
    }
}
