//! Integration tests for ocisign request signing.
//!
//! Each test starts an in-process HTTP listener that plays the part of the
//! Object Storage front end: it rebuilds the signing string of every incoming
//! request, checks the body digest, and verifies the signature with the
//! fixture public key. Requests are sent over a real socket with `reqwest`.
//!
//! Run them with:
//! ```text
//! cargo test -p ocisign-integration
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Once};

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use ocisign_auth::signature::public_key_from_pem;
use ocisign_auth::{Credentials, RequestSigner, SigningRequest, verify_request};
use rsa::RsaPublicKey;
use tokio::net::TcpListener;
use tracing::{debug, warn};

/// Fixture RSA private key (PKCS#8).
pub const TEST_KEY: &str = include_str!("../../../crates/ocisign-auth/tests/fixtures/test_key.pem");
/// Public half of [`TEST_KEY`].
pub const TEST_PUBLIC_KEY: &str =
    include_str!("../../../crates/ocisign-auth/tests/fixtures/test_key_pub.pem");
/// Fixture resource principal session token.
pub const TEST_TOKEN: &str =
    include_str!("../../../crates/ocisign-auth/tests/fixtures/session_token.txt");

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A request signer built from the fixture credentials.
#[must_use]
pub fn test_signer() -> RequestSigner {
    RequestSigner::from_credentials(&Credentials::new(TEST_TOKEN, TEST_KEY))
        .expect("fixture credentials are valid")
}

/// Start a listener on a random local port that verifies signed requests.
///
/// Verified requests get `200` with a JSON summary of what was checked;
/// anything else gets `401` with the verification error.
pub async fn start_verifying_server() -> SocketAddr {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("listener address");
    let public_key =
        Arc::new(public_key_from_pem(TEST_PUBLIC_KEY).expect("fixture public key is valid"));

    tokio::spawn(async move {
        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let public_key = Arc::clone(&public_key);
            tokio::spawn(async move {
                let svc = service_fn(move |req| handle(req, Arc::clone(&public_key)));
                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), svc)
                    .await
                {
                    warn!(peer_addr = %peer_addr, error = %e, "connection error");
                }
            });
        }
    });

    addr
}

async fn handle(
    req: Request<Incoming>,
    public_key: Arc<RsaPublicKey>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            Bytes::new()
        }
    };

    let (status, payload) = match verify_request(&parts, &body, &public_key) {
        Ok(params) => {
            debug!(method = %parts.method, uri = %parts.uri, "verified request");
            (
                StatusCode::OK,
                serde_json::json!({
                    "verified": true,
                    "keyId": params.key_id,
                    "headers": params.headers,
                    "contentLength": body.len(),
                }),
            )
        }
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "code": "NotAuthenticated", "message": e.to_string() }),
        ),
    };

    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(payload.to_string())))
        .expect("static response parts are valid"))
}

/// Sign `method path` with `body` and send it to `addr`.
pub async fn send_signed(
    signer: &RequestSigner,
    addr: SocketAddr,
    method: Method,
    path: &str,
    body: Option<Bytes>,
) -> anyhow::Result<reqwest::Response> {
    let mut request = SigningRequest::new(method.clone(), addr.to_string(), path)
        .with_date(chrono::Utc::now())?;
    if let Some(body) = body.clone() {
        request = request.with_body(body);
    }
    let signed = signer.sign(&request)?;

    let mut headers = request.headers().clone();
    signed.merge_into(&mut headers);

    let mut builder = reqwest::Client::new()
        .request(method, format!("http://{addr}{path}"))
        .headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }
    Ok(builder.send().await?)
}

mod test_signing;
