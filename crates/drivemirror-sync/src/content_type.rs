//! MIME type lookup for uploads

/// Signature of a content-type lookup, injectable into the executor
pub type ContentTypeFn = fn(&str) -> String;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Best-guess content type from a file name's extension
///
/// Names without a known extension fall back to `application/octet-stream`.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}
