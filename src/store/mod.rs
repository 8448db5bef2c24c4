//! Object store capability consumed by the rename engine.
//!
//! The store is flat: one object per exact key, `/` is only a naming convention.
//! Implementations must make each `copy` complete before returning so a
//! following `delete` of the source is safe.

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use std::io;
use thiserror::Error;

/// Largest page a listing call may return (mirrors the S3 `MaxKeys` ceiling).
pub const MAX_PAGE_SIZE: usize = 1000;

/// Read-only snapshot of one object as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub storage_class: Option<String>,
    /// Content type recorded by the store, if any.
    pub content_type: Option<String>,
}

impl ObjectEntry {
    /// Entry carrying only a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
            last_modified: None,
            etag: None,
            storage_class: None,
            content_type: None,
        }
    }
}

/// One bounded page of a listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub entries: Vec<ObjectEntry>,
    /// Opaque cursor for the next page; `None` when the listing is exhausted.
    pub next_continuation_token: Option<String>,
}

/// Failures reported by a store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("{op} '{key}': {source}{}", io_hint(.source))]
    Io {
        op: &'static str,
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Closure for `.map_err(...)` that attaches the operation and key to an io::Error.
    pub fn io<'a>(op: &'static str, key: &'a str) -> impl FnOnce(io::Error) -> StoreError + 'a {
        move |source| StoreError::Io {
            op,
            key: key.to_string(),
            source,
        }
    }
}

/// Short actionable hint appended to io failures.
fn io_hint(e: &io::Error) -> &'static str {
    match e.kind() {
        io::ErrorKind::PermissionDenied => " (permission denied; check ownership and write permissions)",
        io::ErrorKind::NotFound => " (path not found; verify it exists)",
        io::ErrorKind::AlreadyExists => " (already exists; remove it or choose another key)",
        io::ErrorKind::StorageFull => " (insufficient space on device)",
        io::ErrorKind::ReadOnlyFilesystem => " (read-only filesystem; cannot write here)",
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => " (busy or timed out; retry later)",
        _ => "",
    }
}

/// Capability set the engine needs from an object store.
pub trait ObjectStore: Send + Sync {
    /// List objects whose key starts with `prefix`, at most `max_keys` per page
    /// (store default when `None`), resuming from `continuation_token`.
    fn list(
        &self,
        prefix: &str,
        max_keys: Option<usize>,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Copy `src_key` to `dst_key`, overwriting any existing destination.
    fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub(crate) fn effective_page_size(max_keys: Option<usize>) -> usize {
    max_keys.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_carries_op_key_and_hint() {
        let err = StoreError::io("copy object", "a/b.txt")(io::Error::from(io::ErrorKind::NotFound));
        let msg = err.to_string();
        assert!(msg.starts_with("copy object 'a/b.txt':"), "{msg}");
        assert!(msg.contains("verify it exists"), "{msg}");
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(effective_page_size(None), MAX_PAGE_SIZE);
        assert_eq!(effective_page_size(Some(0)), 1);
        assert_eq!(effective_page_size(Some(5000)), MAX_PAGE_SIZE);
        assert_eq!(effective_page_size(Some(2)), 2);
    }
}
