use crate::error::{Operation, VaultError};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// Raw Vault response envelope. `data` is left untyped; its shape is checked
/// by the decoders.
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub auth: Option<serde_json::Value>,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// Thin HTTP layer over the Vault API: one request per call, no retries.
pub struct HttpTransport {
    base_url: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, VaultError> {
        let raw = base_url.into();
        if raw.is_empty() {
            return Err(VaultError::InvalidConfig("Vault address is empty".to_string()));
        }
        let base_url = Url::parse(&raw)
            .map_err(|e| VaultError::InvalidConfig(format!("Invalid Vault address {:?}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(VaultError::InvalidConfig(format!("Invalid Vault address {:?}", raw)));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| VaultError::InvalidConfig(format!("Failed to init HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http,
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `<base>/v1/<path>` with every path segment percent-encoded, so `#`, `?`
    /// and `%` stay part of the secret name.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("v1");
            segments.extend(path.trim_start_matches('/').split('/'));
        }
        url
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// `None` when the path does not exist.
    pub async fn read(&self, path: &str) -> Result<Option<ApiResponse>, VaultError> {
        self.send(Operation::Read, Method::GET, path, None).await
    }

    /// `None` when nothing exists under the prefix.
    pub async fn list(&self, path: &str) -> Result<Option<ApiResponse>, VaultError> {
        self.send(Operation::List, Method::GET, path, None).await
    }

    pub async fn lookup_self(&self) -> Result<Option<ApiResponse>, VaultError> {
        self.send(Operation::LookupSelf, Method::GET, "auth/token/lookup-self", None)
            .await
    }

    pub async fn write(
        &self,
        operation: Operation,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Option<ApiResponse>, VaultError> {
        self.send(operation, Method::POST, path, Some(body)).await
    }

    async fn send(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Option<ApiResponse>, VaultError> {
        let mut url = self.endpoint(path);
        if operation == Operation::List {
            url.query_pairs_mut().append_pair("list", "true");
        }
        tracing::debug!(%operation, path, "Sending Vault request");

        let mut request = self.http.request(method, url);
        if let Some(ref token) = self.token {
            request = request.header("X-Vault-Token", token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| VaultError::RequestError {
            operation,
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| VaultError::RequestError {
            operation,
            path: path.to_string(),
            message: e.to_string(),
        })?;

        if status == StatusCode::NOT_FOUND && matches!(operation, Operation::Read | Operation::List) {
            return Ok(None);
        }

        if !status.is_success() {
            tracing::warn!(%operation, path, status = status.as_u16(), "Vault rejected request");
            return Err(VaultError::ClientError {
                operation,
                path: path.to_string(),
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| VaultError::decode(path, format!("Invalid response: {}", e)))
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_vault_errors() {
        let body = r#"{"errors": ["permission denied", "invalid token"]}"#;
        assert_eq!(error_message(body), "permission denied; invalid token");
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("bad gateway\n"), "bad gateway");
        assert_eq!(error_message(r#"{"errors": []}"#), r#"{"errors": []}"#);
    }

    #[test]
    fn test_rejects_empty_address() {
        let result = HttpTransport::new("", None);
        assert!(matches!(result, Err(VaultError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unparseable_address() {
        let result = HttpTransport::new("vault:8200 with spaces", None);
        assert!(matches!(result, Err(VaultError::InvalidConfig(_))));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let transport = HttpTransport::new("http://vault:8200", None).unwrap();
        assert_eq!(
            transport.endpoint("secret/foo#bar").as_str(),
            "http://vault:8200/v1/secret/foo%23bar"
        );
        assert_eq!(
            transport.endpoint("secret/a?b/100%").as_str(),
            "http://vault:8200/v1/secret/a%3Fb/100%25"
        );
        assert_eq!(
            transport.endpoint("secret/metadata/").as_str(),
            "http://vault:8200/v1/secret/metadata/"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let transport = HttpTransport::new("https://proxy.local/vault/", None).unwrap();
        assert_eq!(
            transport.endpoint("secret/data/foo").as_str(),
            "https://proxy.local/vault/v1/secret/data/foo"
        );
    }

    #[test]
    fn test_trims_trailing_slash() {
        let transport = HttpTransport::new("http://vault:8200/", None).unwrap();
        assert_eq!(transport.base_url(), "http://vault:8200");
    }
}
