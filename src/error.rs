use std::fmt;
use thiserror::Error;

/// What the client was doing when a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    List,
    Write,
    Login,
    LookupSelf,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::List => "list",
            Operation::Write => "write",
            Operation::Login => "login at",
            Operation::LookupSelf => "look up token at",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Secret not found: {path}")]
    SecretNotFound { path: String },

    #[error("Unexpected response for {path}: {message}")]
    DecodeError { path: String, message: String },

    #[error("No field {field:?} for secret in {path:?}")]
    FieldNotFound { path: String, field: String },

    #[error("Field {field:?} in {path:?} has type {found}, expected string")]
    TypeMismatch {
        path: String,
        field: String,
        found: &'static str,
    },

    #[error("Value is empty for field {field:?} in {path:?}")]
    EmptyValue { path: String, field: String },

    #[error("Failed to {operation} {path:?}: {message}")]
    RequestError {
        operation: Operation,
        path: String,
        message: String,
    },

    #[error("Vault client error ({status}) on {operation} {path:?}: {message}")]
    ClientError {
        operation: Operation,
        path: String,
        status: u16,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid secret path: {0:?}")]
    InvalidPath(String),
}

impl VaultError {
    pub fn is_auth(&self) -> bool {
        matches!(self, VaultError::AuthError(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::SecretNotFound { .. })
    }

    pub(crate) fn decode(path: &str, message: impl Into<String>) -> Self {
        VaultError::DecodeError {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
