//! OCI HTTP signature request signing with resource principal session tokens.
//!
//! This crate signs outbound requests to OCI control-plane APIs (such as
//! Object Storage) using the delegated credentials the OCI Functions platform
//! provides: a short-lived resource principal session token (RPST) and the
//! RSA private key it was issued for.
//!
//! # Overview
//!
//! OCI uses the draft-cavage HTTP signature scheme with a `version="1"`
//! marker. A request is signed by:
//!
//! 1. Deriving the key identifier `ST$<session token>`.
//! 2. Choosing the headers to sign: `host date (request-target)`, plus
//!    `content-type content-length x-content-sha256` for `POST` and `PUT`.
//! 3. Building the newline-joined signing string from those header values.
//! 4. Signing it with RSA-SHA256 and placing the result in `Authorization`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use http::Method;
//! use ocisign_auth::credentials::{CredentialProvider, FileCredentialProvider};
//! use ocisign_auth::{RequestSigner, SigningRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = FileCredentialProvider::new("/rp/rpst", "/rp/private.pem");
//! let signer = RequestSigner::from_credentials(&provider.credentials()?)?;
//!
//! let request = SigningRequest::new(
//!     Method::GET,
//!     "objectstorage.us-phoenix-1.oraclecloud.com",
//!     "/n/ns1/b/?compartmentId=ocid1.compartment.oc1..bbb",
//! )
//! .with_date(chrono::Utc::now())?;
//!
//! let signed = signer.sign(&request)?;
//! println!("{}", signed.authorization());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Signing string construction
//! - [`claims`] - Claim extraction from session tokens
//! - [`credentials`] - Credential provider trait and implementations
//! - [`date`] - `date` header formatting
//! - [`digest`] - Body digest for `x-content-sha256`
//! - [`error`] - Signing error types
//! - [`headers`] - Signing methods and header-set selection
//! - [`signature`] - RSA-SHA256 signatures
//! - [`signer`] - Request signing and `Authorization` formatting
//! - [`token`] - Session tokens and key identifiers
//! - [`verify`] - Verification of signed requests

pub mod canonical;
pub mod claims;
pub mod credentials;
pub mod date;
pub mod digest;
pub mod error;
pub mod headers;
pub mod signature;
pub mod signer;
pub mod token;
pub mod verify;

pub use claims::{Claims, decode_claims, tenancy_id};
pub use credentials::{
    CredentialProvider, Credentials, FileCredentialProvider, StaticCredentialProvider,
};
pub use error::SignError;
pub use headers::{SigningHeader, SigningMethod};
pub use signature::RsaSigner;
pub use signer::{RequestSigner, SignedHeaders, SigningRequest, parse_authorization};
pub use token::{KeyId, SessionToken};
pub use verify::verify_request;
