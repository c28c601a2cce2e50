use crate::auth::{AppRoleAuth, AuthMethod, Credential, CredentialSource, TokenResolver, TokenSourceConfig};
use crate::decode::{
    DecodeFailure, decode_nested_record, decode_record, decode_string, decode_string_list, decode_u64,
    decode_version,
};
use crate::error::{Operation, VaultError};
use crate::models::{EmptyValuePolicy, KvEngine, SecretRecord, VersionedRecord};
use crate::path::{DATA_SEGMENT, METADATA_SEGMENT, join_child, kv_v2_path};
use crate::transport::{ApiResponse, HttpTransport};
use std::time::Duration;

const ADDR_ENV_VAR: &str = "VAULT_ADDR";
const DEFAULT_ADDR: &str = "https://127.0.0.1:8200";

pub struct VaultClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    token_source: Option<TokenSourceConfig>,
    approle: Option<(String, String)>,
    approle_mount: Option<String>,
    engine: KvEngine,
    empty_values: EmptyValuePolicy,
    timeout: Option<Duration>,
}

impl Default for VaultClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            token_source: None,
            approle: None,
            approle_mount: None,
            engine: KvEngine::default(),
            empty_values: EmptyValuePolicy::default(),
            timeout: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use this token as is, skipping the lookup chain
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Inputs for the environment / token file lookup chain
    pub fn token_source(mut self, config: TokenSourceConfig) -> Self {
        self.token_source = Some(config);
        self
    }

    /// Log in with AppRole instead of using an existing token
    pub fn approle(mut self, role_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
        self.approle = Some((role_id.into(), secret_id.into()));
        self
    }

    pub fn approle_mount(mut self, mount: impl Into<String>) -> Self {
        self.approle_mount = Some(mount.into());
        self
    }

    pub fn engine(mut self, engine: KvEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn empty_values(mut self, policy: EmptyValuePolicy) -> Self {
        self.empty_values = policy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn resolve_config(self) -> Result<ResolvedConfig, VaultError> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var(ADDR_ENV_VAR).ok())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let auth = if let Some(token) = self.token {
            if token.is_empty() {
                return Err(VaultError::AuthError("explicit token is empty".to_string()));
            }
            AuthConfig::Token(token)
        } else if let Some((role_id, secret_id)) = self.approle {
            let mut auth = AppRoleAuth::new(role_id, secret_id);
            if let Some(mount) = self.approle_mount {
                auth = auth.with_mount(mount);
            }
            AuthConfig::Method(Box::new(auth))
        } else {
            let config = self.token_source.unwrap_or_else(TokenSourceConfig::from_env);
            AuthConfig::Method(Box::new(TokenResolver::new(config)))
        };

        Ok(ResolvedConfig {
            base_url,
            auth,
            engine: self.engine,
            empty_values: self.empty_values,
            timeout: self.timeout,
        })
    }

    pub async fn build(self) -> Result<VaultClient, VaultError> {
        let config = self.resolve_config()?;
        let mut transport = HttpTransport::new(config.base_url, config.timeout)?;

        let credential = match config.auth {
            AuthConfig::Token(token) => Credential::static_token(token, CredentialSource::Explicit),
            AuthConfig::Method(method) => method.authenticate(&transport).await?,
        };
        transport.set_token(credential.token.clone());

        tracing::debug!(
            base_url = transport.base_url(),
            engine = ?config.engine,
            source = ?credential.source,
            "Vault client ready"
        );

        Ok(VaultClient {
            transport,
            credential,
            engine: config.engine,
            empty_values: config.empty_values,
        })
    }
}

enum AuthConfig {
    Token(String),
    Method(Box<dyn AuthMethod>),
}

struct ResolvedConfig {
    base_url: String,
    auth: AuthConfig,
    engine: KvEngine,
    empty_values: EmptyValuePolicy,
    timeout: Option<Duration>,
}

/// Read/list access to a KV mount of either engine version.
///
/// Every call is a single round-trip; nothing is cached between calls.
pub struct VaultClient {
    transport: HttpTransport,
    credential: Credential,
    engine: KvEngine,
    empty_values: EmptyValuePolicy,
}

impl VaultClient {
    /// Token from `VAULT_TOKEN` or `~/.vault-token`, address from `VAULT_ADDR`.
    pub async fn from_env(engine: KvEngine) -> Result<Self, VaultError> {
        VaultClientBuilder::new().engine(engine).build().await
    }

    pub fn builder() -> VaultClientBuilder {
        VaultClientBuilder::new()
    }

    pub fn engine(&self) -> KvEngine {
        self.engine
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    fn physical_path(&self, path: &str, segment: &str) -> String {
        match self.engine {
            KvEngine::V1 => path.to_string(),
            KvEngine::V2 => kv_v2_path(path, segment),
        }
    }

    /// Fetch the response body at the data path of `path`.
    async fn read_body(&self, path: &str) -> Result<SecretRecord, VaultError> {
        check_path(path)?;
        let physical = self.physical_path(path, DATA_SEGMENT);
        tracing::debug!(path, physical = %physical, "Reading secret");

        let response = self
            .transport
            .read(&physical)
            .await?
            .ok_or_else(|| VaultError::SecretNotFound { path: path.to_string() })?;
        body_record(response, path)
    }

    pub async fn read(&self, path: &str) -> Result<SecretRecord, VaultError> {
        let mut body = self.read_body(path).await?;
        match self.engine {
            KvEngine::V1 => Ok(body),
            KvEngine::V2 => decode_nested_record(&mut body, "data")
                .map_err(|f| f.into_shape_error(path, "data", "object")),
        }
    }

    /// Like [`read`](Self::read), also decoding the KV v2 version metadata.
    pub async fn read_versioned(&self, path: &str) -> Result<VersionedRecord, VaultError> {
        let mut body = self.read_body(path).await?;
        match self.engine {
            KvEngine::V1 => Ok(VersionedRecord {
                data: body,
                version: None,
            }),
            KvEngine::V2 => {
                let data = decode_nested_record(&mut body, "data")
                    .map_err(|f| f.into_shape_error(path, "data", "object"))?;
                let metadata = decode_nested_record(&mut body, "metadata")
                    .map_err(|f| f.into_shape_error(path, "metadata", "object"))?;
                let version = decode_version(&metadata)
                    .map_err(|f| f.into_shape_error(path, "metadata", "version metadata"))?;
                Ok(VersionedRecord {
                    data,
                    version: Some(version),
                })
            }
        }
    }

    /// Read one string field of a secret.
    pub async fn read_field(&self, path: &str, field: &str) -> Result<String, VaultError> {
        let record = self.read(path).await?;
        decode_string(&record, field, self.empty_values).map_err(|f| f.into_field_error(path, field))
    }

    /// Full paths of the children under `path`, in the order the store returns them.
    pub async fn list(&self, path: &str) -> Result<Vec<String>, VaultError> {
        check_path(path)?;
        let physical = self.physical_path(path, METADATA_SEGMENT);
        tracing::debug!(path, physical = %physical, "Listing secrets");

        let response = self
            .transport
            .list(&physical)
            .await?
            .ok_or_else(|| VaultError::SecretNotFound { path: path.to_string() })?;
        let body = body_record(response, path)?;

        let keys = decode_string_list(&body, "keys")
            .map_err(|f| f.into_shape_error(path, "keys", "array of strings"))?;
        Ok(keys.iter().map(|key| join_child(path, key)).collect())
    }

    /// Store `fields` at `path`, replacing the current value.
    pub async fn write(&self, path: &str, fields: &SecretRecord) -> Result<(), VaultError> {
        check_path(path)?;
        let physical = self.physical_path(path, DATA_SEGMENT);
        let body = match self.engine {
            KvEngine::V1 => serde_json::json!(fields),
            KvEngine::V2 => serde_json::json!({ "data": fields }),
        };
        tracing::debug!(path, physical = %physical, "Writing secret");

        self.transport.write(Operation::Write, &physical, &body).await?;
        Ok(())
    }

    /// Remaining time-to-live of the client's own token, in seconds.
    pub async fn token_ttl(&self) -> Result<u64, VaultError> {
        const LOOKUP_PATH: &str = "auth/token/lookup-self";

        let response = self
            .transport
            .lookup_self()
            .await?
            .ok_or_else(|| VaultError::decode(LOOKUP_PATH, "empty token lookup response"))?;
        let body = body_record(response, LOOKUP_PATH)?;

        decode_u64(&body, "ttl").map_err(|f| f.into_shape_error(LOOKUP_PATH, "ttl", "non-negative integer"))
    }
}

/// Logical paths start with the mount name, never with `/`.
fn check_path(path: &str) -> Result<(), VaultError> {
    if path.starts_with('/') || path.trim_end_matches('/').is_empty() {
        return Err(VaultError::InvalidPath(path.to_string()));
    }
    Ok(())
}

fn body_record(response: ApiResponse, path: &str) -> Result<SecretRecord, VaultError> {
    let data = response.data.ok_or(DecodeFailure::Missing);
    data.and_then(decode_record)
        .map_err(|f| f.into_shape_error(path, "data", "object"))
}
