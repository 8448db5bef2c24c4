//! Key and prefix helpers.

use crate::errors::RenameError;

/// `key` with a trailing `/` appended unless it already has one.
pub fn normalize_prefix(key: &str) -> String {
    if key.ends_with('/') {
        key.to_string()
    } else {
        format!("{key}/")
    }
}

/// Replace `old_prefix` with `new_prefix` at the start of `key`, once.
/// Returns `None` when `key` does not start with `old_prefix`; later
/// occurrences of the old prefix inside the key are left alone.
pub fn substitute_prefix(key: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    key.strip_prefix(old_prefix)
        .map(|rest| format!("{new_prefix}{rest}"))
}

/// Reject missing or blank keys.
pub(crate) fn require_key<'a>(what: &str, key: &'a str) -> Result<&'a str, RenameError> {
    if key.trim().is_empty() {
        return Err(RenameError::InvalidRequest(format!("{what} is required")));
    }
    Ok(key)
}
