// Shared by the integration test binaries; not every binary uses every helper.
#![allow(dead_code)]

use lib_vault::{KvEngine, VaultClient};
use serde_json::{Value, json};

pub const ROOT_TOKEN: &str = "root";

pub async fn mock_vault_client(mock_uri: &str, engine: KvEngine) -> VaultClient {
    VaultClient::builder()
        .base_url(mock_uri)
        .token(ROOT_TOKEN)
        .engine(engine)
        .build()
        .await
        .unwrap()
}

/// Vault response envelope around `data`.
pub fn vault_response(data: Value) -> Value {
    json!({
        "request_id": "test-request-id",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": data,
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

/// Helper to create a Vault KV2 response in the expected format.
pub fn vault_kv2_response(data: Value) -> Value {
    vault_response(json!({
        "data": data,
        "metadata": {
            "created_time": "2024-01-01T00:00:00.000000000Z",
            "deletion_time": "",
            "destroyed": false,
            "version": 1,
            "custom_metadata": null
        }
    }))
}

pub fn keys_response(keys: &[&str]) -> Value {
    vault_response(json!({ "keys": keys }))
}
