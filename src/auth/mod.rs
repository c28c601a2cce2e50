mod approle;
mod credential;
mod token;

pub use approle::AppRoleAuth;
pub use credential::{Credential, CredentialSource};
pub use token::{TokenResolver, TokenSourceConfig};

use crate::VaultError;
use crate::transport::HttpTransport;
use async_trait::async_trait;

/// Trait for authentication methods
#[async_trait]
pub trait AuthMethod: Send + Sync {
    /// Produce the credential used for every subsequent call
    async fn authenticate(&self, transport: &HttpTransport) -> Result<Credential, VaultError>;
}
