use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;

/// Extension of a client-supplied file name, with the leading dot.
///
/// Only ASCII alphanumeric extensions up to ten characters survive; anything
/// else yields an empty string so hostile names cannot shape the stored path.
pub fn sanitized_extension(file_name: &str) -> String {
    // Clients on Windows send backslash-separated paths.
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let ext = match Path::new(base).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext,
        None => return String::new(),
    };

    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return String::new();
    }

    format!(".{}", ext.to_ascii_lowercase())
}

/// `{unix_millis}-{uuid}{ext}`. The timestamp keeps names roughly ordered by
/// ingestion time, the v4 UUID keeps them unique within the same millisecond.
pub fn generate_stored_name(extension: &str) -> String {
    format!("{}-{}{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple(), extension)
}

/// A stored name must be a single plain path component.
pub fn is_valid_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}
