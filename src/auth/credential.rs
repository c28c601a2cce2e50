use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where a credential came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    Environment,
    TokenFile(PathBuf),
    AppRole,
}

/// Bearer token for the secret store
#[derive(Clone)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
    /// Zero when the source does not report one
    pub lease_duration: Duration,
    pub renewable: bool,
}

impl Credential {
    /// Token handed over as is, without lease information
    pub fn static_token(token: String, source: CredentialSource) -> Self {
        Self {
            token,
            source,
            lease_duration: Duration::ZERO,
            renewable: false,
        }
    }

    pub fn from_login(token: String, lease_duration: Duration, renewable: bool) -> Self {
        Self {
            token,
            source: CredentialSource::AppRole,
            lease_duration,
            renewable,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("source", &self.source)
            .field("lease_duration", &self.lease_duration)
            .field("renewable", &self.renewable)
            .finish()
    }
}
