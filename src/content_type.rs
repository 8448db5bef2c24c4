//! Content type inference for downloads when the store does not record one.

const OCTET_STREAM: &str = "application/octet-stream";

/// Content type implied by the extension of the key's last segment.
pub fn for_key(key: &str) -> &'static str {
    let name = key.rsplit('/').next().unwrap_or(key);
    let Some((_, ext)) = name.rsplit_once('.') else {
        return OCTET_STREAM;
    };
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "json" => "application/json",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "zip" => "application/zip",
        _ => OCTET_STREAM,
    }
}

/// The store-supplied type when present, otherwise the inferred one.
pub fn resolve<'a>(stored: Option<&'a str>, key: &str) -> &'a str {
    match stored {
        Some(ct) if !ct.trim().is_empty() => ct,
        _ => for_key(key),
    }
}
