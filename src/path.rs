//! Logical-to-physical path mapping for the KV secrets engines.

/// Segment inserted by KV v2 when reading or writing secret data.
pub const DATA_SEGMENT: &str = "data";
/// Segment inserted by KV v2 when listing or inspecting metadata.
pub const METADATA_SEGMENT: &str = "metadata";

/// Rewrite a logical path into its KV v2 physical form.
///
/// The path is terminated with `/` if needed, then the first `/` is replaced
/// by `/<segment>/`. `secret/foo` becomes `secret/<segment>/foo`, a bare
/// mount `secret` becomes `secret/<segment>/`, and a caller-supplied
/// trailing slash is kept as is.
pub fn kv_v2_path(path: &str, segment: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + segment.len() + 3);
    normalized.push_str(path);
    let appended = !normalized.ends_with('/');
    if appended {
        normalized.push('/');
    }

    // Always present: the string ends with '/'.
    let first = normalized.find('/').unwrap_or(normalized.len() - 1);
    let mut rewritten = String::with_capacity(normalized.len() + segment.len() + 1);
    rewritten.push_str(&normalized[..first]);
    rewritten.push('/');
    rewritten.push_str(segment);
    rewritten.push_str(&normalized[first..]);

    // Only the slash we appended is dropped again, and only when it is not
    // the separator that received the segment.
    if appended && rewritten.len() > first + segment.len() + 2 {
        rewritten.pop();
    }
    rewritten
}

/// Join a child key returned by a list call onto its logical prefix.
pub(crate) fn join_child(prefix: &str, key: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), key)
}
