//! Credential provider trait and implementations.
//!
//! A [`CredentialProvider`] hands out the current session token and private key
//! on demand, so the signing code does not care whether they live in memory,
//! on disk, or in a secret store. [`FileCredentialProvider`] reads the files the
//! OCI Functions platform mounts for resource principals;
//! [`StaticCredentialProvider`] serves fixed values for tests and development.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SignError;

/// A session token together with the private key it was issued for.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    session_token: String,
    private_key_pem: String,
}

impl Credentials {
    /// Bundle a raw session token and a PEM private key.
    pub fn new(session_token: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
            private_key_pem: private_key_pem.into(),
        }
    }

    /// The raw session token.
    #[must_use]
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// The PEM-encoded private key.
    #[must_use]
    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("session_token_len", &self.session_token.len())
            .finish_non_exhaustive()
    }
}

/// Trait for retrieving the current resource principal credentials.
///
/// Implementations may back this with files, environment variables, or a
/// secret manager.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the current credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::CredentialUnavailable`] if the backing store cannot be read.
    fn credentials(&self) -> Result<Credentials, SignError>;
}

/// A provider that always returns the same credentials.
///
/// # Examples
///
/// ```
/// use ocisign_auth::credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(Credentials::new("h.p.s", "pem"));
/// assert_eq!(provider.credentials().unwrap().session_token(), "h.p.s");
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Create a provider serving `credentials`.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials, SignError> {
        Ok(self.credentials.clone())
    }
}

/// Where the session token comes from.
#[derive(Clone, PartialEq, Eq)]
enum TokenSource {
    File(PathBuf),
    Inline(String),
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Inline(token) => write!(f, "Inline(<{} bytes>)", token.len()),
        }
    }
}

/// A provider that reads the session token and private key from files on every call.
///
/// Reading on each call picks up tokens the platform refreshes in place.
#[derive(Debug, Clone)]
pub struct FileCredentialProvider {
    token: TokenSource,
    private_key_path: PathBuf,
}

impl FileCredentialProvider {
    /// Read the token from `token_path` and the key from `private_key_path`.
    pub fn new(token_path: impl Into<PathBuf>, private_key_path: impl Into<PathBuf>) -> Self {
        Self {
            token: TokenSource::File(token_path.into()),
            private_key_path: private_key_path.into(),
        }
    }

    /// Interpret `rpst` the way the platform sets it: a path to the token file,
    /// or, when no such file exists and the value looks like a token, the token itself.
    pub fn resolve(rpst: &str, private_key_path: impl Into<PathBuf>) -> Self {
        let token = if !Path::new(rpst).exists() && rpst.split('.').count() >= 3 {
            TokenSource::Inline(rpst.trim().to_owned())
        } else {
            TokenSource::File(PathBuf::from(rpst))
        };
        Self {
            token,
            private_key_path: private_key_path.into(),
        }
    }
}

impl CredentialProvider for FileCredentialProvider {
    fn credentials(&self) -> Result<Credentials, SignError> {
        let session_token = match &self.token {
            TokenSource::Inline(token) => token.clone(),
            TokenSource::File(path) => read_file(path, "session token")?.trim().to_owned(),
        };
        let private_key_pem = read_file(&self.private_key_path, "private key")?;

        debug!(
            session_token_len = session_token.len(),
            private_key_path = %self.private_key_path.display(),
            "Loaded resource principal credentials"
        );

        Ok(Credentials::new(session_token, private_key_pem))
    }
}

fn read_file(path: &Path, what: &str) -> Result<String, SignError> {
    std::fs::read_to_string(path).map_err(|source| SignError::CredentialUnavailable {
        what: format!("{what} at {}", path.display()),
        source,
    })
}
