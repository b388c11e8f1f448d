//! Configuration for ocisign.
//!
//! All configuration is driven by environment variables, matching the names the
//! OCI Functions platform injects for resource principal authentication.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{OciSignError, OciSignResult};
use crate::types::Region;

/// Resource principal configuration.
///
/// # Examples
///
/// ```
/// use ocisign_core::OciSignConfig;
///
/// let config = OciSignConfig::default();
/// assert_eq!(config.region, "us-phoenix-1");
/// assert!(config.rpst.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct OciSignConfig {
    /// Session token file path, or the token itself.
    #[builder(default, setter(strip_option))]
    pub rpst: Option<String>,

    /// Path of the PEM-encoded private key matching the session token.
    #[builder(default, setter(strip_option))]
    pub private_pem: Option<String>,

    /// OCI region the function runs in.
    #[builder(default = String::from(Region::DEFAULT))]
    pub region: String,

    /// Explicit Object Storage endpoint, overriding the one derived from the region.
    #[builder(default, setter(strip_option))]
    pub object_storage_endpoint: Option<String>,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for OciSignConfig {
    fn default() -> Self {
        Self {
            rpst: None,
            private_pem: None,
            region: String::from(Region::DEFAULT),
            object_storage_endpoint: None,
            log_level: String::from("info"),
        }
    }
}

impl OciSignConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OCI_RESOURCE_PRINCIPAL_RPST` | *(unset)* |
    /// | `OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM` | *(unset)* |
    /// | `OCI_RESOURCE_PRINCIPAL_REGION` | `us-phoenix-1` |
    /// | `OBJECT_STORAGE_ENDPOINT` | derived from the region |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("OCI_RESOURCE_PRINCIPAL_RPST") {
            config.rpst = Some(v);
        }
        if let Some(v) = lookup("OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM") {
            config.private_pem = Some(v);
        }
        if let Some(v) = lookup("OCI_RESOURCE_PRINCIPAL_REGION") {
            config.region = v;
        }
        if let Some(v) = lookup("OBJECT_STORAGE_ENDPOINT") {
            config.object_storage_endpoint = Some(v.trim_end_matches('/').to_owned());
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// The configured region, validated.
    pub fn region(&self) -> OciSignResult<Region> {
        Region::new(self.region.clone())
    }

    /// The Object Storage base URL to send requests to.
    ///
    /// An explicit endpoint must be a non-empty `http://` or `https://` URL.
    pub fn object_storage_endpoint(&self) -> OciSignResult<String> {
        match &self.object_storage_endpoint {
            Some(endpoint) if endpoint.is_empty() => Err(OciSignError::Config(
                "OBJECT_STORAGE_ENDPOINT is set but empty".to_owned(),
            )),
            Some(endpoint)
                if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") =>
            {
                Err(OciSignError::Config(format!(
                    "OBJECT_STORAGE_ENDPOINT must be an http(s) URL, got {endpoint:?}"
                )))
            }
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(self.region()?.object_storage_endpoint()),
        }
    }
}
