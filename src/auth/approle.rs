use super::{AuthMethod, Credential};
use crate::VaultError;
use crate::decode::{DecodeFailure, decode_record, decode_string, decode_u64};
use crate::error::Operation;
use crate::models::EmptyValuePolicy;
use crate::transport::HttpTransport;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_MOUNT: &str = "approle";

/// AppRole authentication: trades a role ID and secret ID for a client token
pub struct AppRoleAuth {
    pub mount: String,
    role_id: String,
    secret_id: String,
}

impl AppRoleAuth {
    pub fn new(role_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
        Self {
            mount: DEFAULT_MOUNT.to_string(),
            role_id: role_id.into(),
            secret_id: secret_id.into(),
        }
    }

    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    fn login_path(&self) -> String {
        format!("auth/{}/login", self.mount.trim_matches('/'))
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    role_id: &'a str,
    secret_id: &'a str,
}

#[async_trait]
impl AuthMethod for AppRoleAuth {
    async fn authenticate(&self, transport: &HttpTransport) -> Result<Credential, VaultError> {
        let path = self.login_path();
        let body = serde_json::to_value(LoginRequest {
            role_id: &self.role_id,
            secret_id: &self.secret_id,
        })
        .map_err(|e| VaultError::AuthError(format!("Invalid login request: {}", e)))?;

        let response = match transport.write(Operation::Login, &path, &body).await {
            Ok(response) => response,
            Err(VaultError::ClientError { status, message, .. }) if (400..500).contains(&status) => {
                return Err(VaultError::AuthError(format!(
                    "Unable to generate token ({}): {}",
                    status, message
                )));
            }
            Err(e) => return Err(e),
        };

        let auth = response
            .and_then(|r| r.auth)
            .ok_or_else(|| VaultError::AuthError("no authentication info returned".to_string()))?;
        let (client_token, lease_duration, renewable) = parse_auth_block(auth)?;

        tracing::info!(mount = %self.mount, ttl_secs = lease_duration, "Authenticated with AppRole");
        Ok(Credential::from_login(
            client_token,
            Duration::from_secs(lease_duration),
            renewable,
        ))
    }
}

/// Client token, lease seconds and renewability out of a login `auth` block.
fn parse_auth_block(auth: serde_json::Value) -> Result<(String, u64, bool), VaultError> {
    let auth = decode_record(auth)
        .map_err(|_| VaultError::AuthError("authentication info is not an object".to_string()))?;

    let client_token = decode_string(&auth, "client_token", EmptyValuePolicy::Reject).map_err(|f| {
        let reason = match f {
            DecodeFailure::Missing => "is missing".to_string(),
            DecodeFailure::Empty => "is empty".to_string(),
            DecodeFailure::TypeMismatch { found } => format!("has type {found}"),
        };
        VaultError::AuthError(format!("client token in login response {reason}"))
    })?;

    let lease_duration = match decode_u64(&auth, "lease_duration") {
        Ok(secs) => secs,
        Err(DecodeFailure::Missing) => 0,
        Err(_) => {
            return Err(VaultError::AuthError(
                "invalid lease duration in login response".to_string(),
            ));
        }
    };
    let renewable = auth
        .get("renewable")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    Ok((client_token, lease_duration, renewable))
}
