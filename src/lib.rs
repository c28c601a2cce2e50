//! lib-vault - read/list helpers over HashiCorp Vault KV secrets engines
//!
//! Token lookup order:
//! 1. `VAULT_TOKEN`
//! 2. `~/.vault-token`
//!
//! An explicit token or an AppRole login configured on the builder replaces
//! the lookup entirely.
//!
//! One [`VaultClient`] serves either KV v1 or KV v2, chosen with
//! [`VaultClientBuilder::engine`]; logical paths are the same for both.

pub mod auth;
mod client;
pub mod decode;
mod error;
mod models;
pub mod path;
mod transport;

pub use auth::{AppRoleAuth, AuthMethod, Credential, CredentialSource, TokenResolver, TokenSourceConfig};
pub use client::{VaultClient, VaultClientBuilder};
pub use error::{Operation, VaultError};
pub use models::{EmptyValuePolicy, KvEngine, KvVersion, SecretRecord, VersionedRecord};
pub use path::kv_v2_path;
pub use transport::HttpTransport;
