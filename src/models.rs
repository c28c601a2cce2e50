use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Field name to untyped value, as returned by the store.
pub type SecretRecord = HashMap<String, serde_json::Value>;

/// Version of the KV secrets engine mounted at the paths a client uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KvEngine {
    V1,
    #[default]
    V2,
}

/// Whether an empty string counts as a usable secret value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyValuePolicy {
    #[default]
    Accept,
    Reject,
}

/// Version metadata of a KV v2 secret, decoded by `decode::decode_version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvVersion {
    pub version: u64,
    pub created_time: DateTime<Utc>,
    /// `None` while the version is live
    pub deletion_time: Option<DateTime<Utc>>,
    pub destroyed: bool,
}

/// A secret record together with its version metadata, when the engine keeps any.
#[derive(Debug, Clone)]
pub struct VersionedRecord {
    pub data: SecretRecord,
    pub version: Option<KvVersion>,
}
