//! Content type resolution for uploads

/// Fallback for extensions with no known mapping
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Resolve the MIME type for an object key from its extension
pub fn content_type_for(key: &str) -> &'static str {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
