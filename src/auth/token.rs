use super::{AuthMethod, Credential, CredentialSource};
use crate::VaultError;
use crate::transport::HttpTransport;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const TOKEN_ENV_VAR: &str = "VAULT_TOKEN";
pub const TOKEN_FILE_NAME: &str = ".vault-token";

/// Inputs of the token lookup chain
#[derive(Debug, Clone, Default)]
pub struct TokenSourceConfig {
    pub env_token: Option<String>,
    pub home_dir: Option<PathBuf>,
}

impl TokenSourceConfig {
    /// Snapshot of `VAULT_TOKEN` and the current user's home directory
    pub fn from_env() -> Self {
        Self {
            env_token: std::env::var(TOKEN_ENV_VAR).ok(),
            home_dir: directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
        }
    }

    pub fn with_env_token(mut self, token: impl Into<String>) -> Self {
        self.env_token = Some(token.into());
        self
    }

    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }
}

/// Resolves a token from the environment, then from `~/.vault-token`.
///
/// A set variable wins even over an existing token file, like the official CLI.
pub struct TokenResolver {
    config: TokenSourceConfig,
}

impl TokenResolver {
    pub fn new(config: TokenSourceConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(TokenSourceConfig::from_env())
    }

    pub fn resolve(&self) -> Result<Credential, VaultError> {
        if let Some(ref token) = self.config.env_token {
            // A set but empty variable still shadows the token file.
            if token.is_empty() {
                return Err(no_token_source());
            }
            tracing::info!(source = "environment", "Resolved Vault token");
            return Ok(Credential::static_token(token.clone(), CredentialSource::Environment));
        }

        let home = self
            .config
            .home_dir
            .as_ref()
            .ok_or_else(|| VaultError::AuthError("error getting user's home directory".to_string()))?;
        let path = home.join(TOKEN_FILE_NAME);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(no_token_source()),
            Err(e) => {
                return Err(VaultError::AuthError(format!(
                    "unable to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let token = content.trim();
        if token.is_empty() {
            return Err(VaultError::AuthError(format!(
                "no token found in your {} file",
                path.display()
            )));
        }

        tracing::info!(source = "token file", path = %path.display(), "Resolved Vault token");
        Ok(Credential::static_token(
            token.to_string(),
            CredentialSource::TokenFile(path),
        ))
    }
}

fn no_token_source() -> VaultError {
    VaultError::AuthError(format!(
        "couldn't find neither ${} nor ~/{} file",
        TOKEN_ENV_VAR, TOKEN_FILE_NAME
    ))
}

#[async_trait]
impl AuthMethod for TokenResolver {
    async fn authenticate(&self, _transport: &HttpTransport) -> Result<Credential, VaultError> {
        self.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn home_with_token(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE_NAME), content).unwrap();
        dir
    }

    #[test]
    fn test_env_token_wins_over_file() {
        let home = home_with_token("from-file");
        let resolver = TokenResolver::new(
            TokenSourceConfig::default()
                .with_env_token("from-env")
                .with_home_dir(home.path()),
        );

        let credential = resolver.resolve().unwrap();
        assert_eq!(credential.token, "from-env");
        assert_eq!(credential.source, CredentialSource::Environment);
    }

    #[test]
    fn test_token_from_file() {
        let home = home_with_token("root\n");
        let resolver = TokenResolver::new(TokenSourceConfig::default().with_home_dir(home.path()));

        let credential = resolver.resolve().unwrap();
        assert_eq!(credential.token, "root");
        assert_eq!(
            credential.source,
            CredentialSource::TokenFile(home.path().join(TOKEN_FILE_NAME))
        );
    }

    #[test]
    fn test_no_token_source() {
        let home = TempDir::new().unwrap();
        let resolver = TokenResolver::new(TokenSourceConfig::default().with_home_dir(home.path()));

        let err = resolver.resolve().unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("VAULT_TOKEN"));
    }

    #[test]
    fn test_empty_token_file() {
        let home = home_with_token("");
        let resolver = TokenResolver::new(TokenSourceConfig::default().with_home_dir(home.path()));

        let err = resolver.resolve().unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("no token found"));
    }

    #[test]
    fn test_whitespace_only_token_file_is_empty() {
        let home = home_with_token("  \n\t");
        let resolver = TokenResolver::new(TokenSourceConfig::default().with_home_dir(home.path()));

        assert!(resolver.resolve().unwrap_err().to_string().contains("no token found"));
    }

    #[test]
    fn test_empty_env_token_shadows_file() {
        let home = home_with_token("from-file");
        let resolver = TokenResolver::new(
            TokenSourceConfig::default()
                .with_env_token("")
                .with_home_dir(home.path()),
        );

        assert!(resolver.resolve().unwrap_err().is_auth());
    }

    #[test]
    fn test_missing_home_dir() {
        let resolver = TokenResolver::new(TokenSourceConfig::default());
        assert!(resolver.resolve().unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn test_authenticate_uses_resolver() {
        let transport = HttpTransport::new("http://vault:8200", None).unwrap();
        let resolver = TokenResolver::new(TokenSourceConfig::default().with_env_token("my-token"));

        let credential = resolver.authenticate(&transport).await.unwrap();
        assert_eq!(credential.token, "my-token");
    }
}
