//! Narrowing of untyped response bodies into typed values.
//!
//! Every decoder returns a [`DecodeFailure`] naming what went wrong instead of
//! a default value; the client attaches path and field context when it turns
//! the failure into a [`VaultError`].

use crate::error::VaultError;
use crate::models::{EmptyValuePolicy, KvVersion, SecretRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    Missing,
    TypeMismatch { found: &'static str },
    Empty,
}

impl DecodeFailure {
    /// Error for a caller-requested field of a secret.
    pub(crate) fn into_field_error(self, path: &str, field: &str) -> VaultError {
        let (path, field) = (path.to_string(), field.to_string());
        match self {
            DecodeFailure::Missing => VaultError::FieldNotFound { path, field },
            DecodeFailure::TypeMismatch { found } => VaultError::TypeMismatch { path, field, found },
            DecodeFailure::Empty => VaultError::EmptyValue { path, field },
        }
    }

    /// Error for a key the response envelope itself must carry.
    pub(crate) fn into_shape_error(self, path: &str, key: &str, expected: &str) -> VaultError {
        let message = match self {
            DecodeFailure::Missing => format!("{key:?} key does not exist"),
            DecodeFailure::TypeMismatch { found } => {
                format!("{key:?} has type {found}, expected {expected}")
            }
            DecodeFailure::Empty => format!("{key:?} is empty"),
        };
        VaultError::decode(path, message)
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Narrow an untyped value into a field mapping.
pub fn decode_record(value: Value) -> Result<SecretRecord, DecodeFailure> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(DecodeFailure::TypeMismatch {
            found: json_type_name(&other),
        }),
    }
}

/// Take a nested field mapping out of a record.
pub fn decode_nested_record(record: &mut SecretRecord, field: &str) -> Result<SecretRecord, DecodeFailure> {
    let value = record.remove(field).ok_or(DecodeFailure::Missing)?;
    decode_record(value)
}

pub fn decode_string(
    record: &SecretRecord,
    field: &str,
    policy: EmptyValuePolicy,
) -> Result<String, DecodeFailure> {
    let value = record.get(field).ok_or(DecodeFailure::Missing)?;
    let Value::String(s) = value else {
        return Err(DecodeFailure::TypeMismatch {
            found: json_type_name(value),
        });
    };
    if s.is_empty() && policy == EmptyValuePolicy::Reject {
        return Err(DecodeFailure::Empty);
    }
    Ok(s.clone())
}

/// Non-negative integer field. Whole floats are accepted since JSON numbers
/// carry no integer guarantee.
pub fn decode_u64(record: &SecretRecord, field: &str) -> Result<u64, DecodeFailure> {
    let value = record.get(field).ok_or(DecodeFailure::Missing)?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(DecodeFailure::TypeMismatch {
            found: json_type_name(value),
        }),
    }
}

pub fn decode_string_list(record: &SecretRecord, field: &str) -> Result<Vec<String>, DecodeFailure> {
    let value = record.get(field).ok_or(DecodeFailure::Missing)?;
    let Value::Array(items) = value else {
        return Err(DecodeFailure::TypeMismatch {
            found: json_type_name(value),
        });
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(DecodeFailure::TypeMismatch {
                found: json_type_name(other),
            }),
        })
        .collect()
}

fn decode_timestamp(record: &SecretRecord, field: &str) -> Result<Option<DateTime<Utc>>, DecodeFailure> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .parse::<DateTime<Utc>>()
            .map(Some)
            .map_err(|_| DecodeFailure::TypeMismatch { found: "string" }),
        Some(other) => Err(DecodeFailure::TypeMismatch {
            found: json_type_name(other),
        }),
    }
}

/// Decode the `metadata` sibling of a KV v2 read.
pub fn decode_version(record: &SecretRecord) -> Result<KvVersion, DecodeFailure> {
    let version = decode_u64(record, "version")?;
    let created_time = decode_timestamp(record, "created_time")?.ok_or(DecodeFailure::Missing)?;
    let deletion_time = decode_timestamp(record, "deletion_time")?;
    let destroyed = match record.get("destroyed") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(DecodeFailure::TypeMismatch {
                found: json_type_name(other),
            });
        }
    };

    Ok(KvVersion {
        version,
        created_time,
        deletion_time,
        destroyed,
    })
}
