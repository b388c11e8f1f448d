//! Common OCI type definitions.

use std::fmt;

/// OCI region identifier (e.g. `us-phoenix-1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Region(String);

impl Region {
    /// Region used when none is configured.
    pub const DEFAULT: &str = "us-phoenix-1";

    /// Create a new region.
    ///
    /// # Errors
    /// Returns an error if the identifier is empty or contains characters
    /// other than lowercase ASCII letters, digits and `-`.
    pub fn new(region: impl Into<String>) -> Result<Self, crate::OciSignError> {
        let region = region.into();
        let valid = !region.is_empty()
            && region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(crate::OciSignError::InvalidRegion(region));
        }
        Ok(Self(region))
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host name of the Object Storage API in this region.
    #[must_use]
    pub fn object_storage_host(&self) -> String {
        format!("objectstorage.{}.oraclecloud.com", self.0)
    }

    /// Base URL of the Object Storage API in this region.
    #[must_use]
    pub fn object_storage_endpoint(&self) -> String {
        format!("https://{}", self.object_storage_host())
    }
}

impl Default for Region {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_to_phoenix() {
        assert_eq!(Region::default().as_str(), "us-phoenix-1");
    }

    #[test]
    fn test_should_derive_object_storage_host() {
        let region = Region::new("eu-frankfurt-1").unwrap();
        assert_eq!(
            region.object_storage_host(),
            "objectstorage.eu-frankfurt-1.oraclecloud.com"
        );
        assert_eq!(
            region.object_storage_endpoint(),
            "https://objectstorage.eu-frankfurt-1.oraclecloud.com"
        );
    }

    #[test]
    fn test_should_reject_invalid_region() {
        assert!(Region::new("").is_err());
        assert!(Region::new("US-PHOENIX-1").is_err());
        assert!(Region::new("us phoenix").is_err());
    }
}
