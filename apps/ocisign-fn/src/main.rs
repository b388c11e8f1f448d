//! ocisign-fn - OCI function listing Object Storage buckets.
//!
//! The function reads its invocation payload from stdin, signs a ListBuckets
//! request with the resource principal credentials the platform mounts, sends
//! it, and writes the JSON response to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! echo '{"namespace":"ns1","compartmentId":"ocid1.compartment.oc1..bbb"}' | ocisign-fn
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OCI_RESOURCE_PRINCIPAL_RPST` | *(required)* | Session token path, or the token itself |
//! | `OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM` | *(required)* | Private key path |
//! | `OCI_RESOURCE_PRINCIPAL_REGION` | `us-phoenix-1` | Region of the Object Storage endpoint |
//! | `OBJECT_STORAGE_ENDPOINT` | *(derived)* | Endpoint override |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use anyhow::{Context, Result};
use chrono::Utc;
use ocisign_auth::{
    CredentialProvider, Credentials, FileCredentialProvider, RequestSigner, decode_claims,
};
use ocisign_core::OciSignConfig;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::handler::{ListBucketsInput, ObjectStorageClient};

/// Initialize the tracing subscriber on stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Build the credential provider from the resource principal configuration.
fn build_credential_provider(config: &OciSignConfig) -> Result<FileCredentialProvider> {
    let rpst = config
        .rpst
        .as_deref()
        .context("OCI_RESOURCE_PRINCIPAL_RPST is not set")?;
    let private_pem = config
        .private_pem
        .as_deref()
        .context("OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM is not set")?;

    Ok(FileCredentialProvider::resolve(rpst, private_pem))
}

/// Log what the session token says about the caller.
fn log_claims(credentials: &Credentials) -> Result<()> {
    let claims = decode_claims(credentials.session_token())
        .context("decoding resource principal session token")?;
    let tenancy_id = claims.tenancy_id().context("reading tenancy from session token")?;

    info!(
        tenancy_id,
        compartment_id = claims.compartment_id().unwrap_or_default(),
        resource_type = claims.resource_type().unwrap_or_default(),
        "loaded resource principal"
    );

    if let Some(expires_at) = claims.expires_at() {
        if expires_at <= Utc::now() {
            warn!(%expires_at, "resource principal session token has expired");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = OciSignConfig::from_env();
    init_tracing(&config.log_level)?;

    let provider = build_credential_provider(&config)?;
    let credentials = provider
        .credentials()
        .context("loading resource principal credentials")?;
    log_claims(&credentials)?;

    let signer = RequestSigner::from_credentials(&credentials)
        .context("creating request signer from resource principal credentials")?;
    let endpoint = config.object_storage_endpoint()?;
    let client = ObjectStorageClient::new(&endpoint, signer)?;

    let mut payload = String::new();
    tokio::io::stdin()
        .read_to_string(&mut payload)
        .await
        .context("reading invocation payload from stdin")?;
    let input: ListBucketsInput =
        serde_json::from_str(&payload).context("parsing invocation payload")?;

    let response = client.list_buckets(&input).await?;
    println!(
        "{}",
        serde_json::to_string(&response).context("serializing response")?
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_require_resource_principal_paths() {
        let config = OciSignConfig::default();
        assert!(build_credential_provider(&config).is_err());

        let config = OciSignConfig::builder()
            .rpst("/rp/rpst".into())
            .private_pem("/rp/private.pem".into())
            .build();
        assert!(build_credential_provider(&config).is_ok());
    }

    #[test]
    fn test_should_load_credentials_through_config_lookup() {
        let token = include_str!("../../../crates/ocisign-auth/tests/fixtures/session_token.txt");
        let key_path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../crates/ocisign-auth/tests/fixtures/test_key.pem"
        );
        let config = OciSignConfig::from_lookup(|key| match key {
            "OCI_RESOURCE_PRINCIPAL_RPST" => Some(token.to_owned()),
            "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM" => Some(key_path.to_owned()),
            _ => None,
        });

        let credentials = build_credential_provider(&config)
            .unwrap()
            .credentials()
            .unwrap();
        assert_eq!(credentials.session_token(), token);
        assert!(credentials.private_key_pem().contains("BEGIN PRIVATE KEY"));
        assert!(log_claims(&credentials).is_ok());
    }

    #[test]
    fn test_should_reject_token_without_tenant() {
        // payload: {"res_type":"fnfunc"}
        let credentials = Credentials::new("e30.eyJyZXNfdHlwZSI6ImZuZnVuYyJ9.c2ln", "");
        assert!(log_claims(&credentials).is_err());
    }
}
