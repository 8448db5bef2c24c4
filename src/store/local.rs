//! Directory-backed object store.
//! Each key is a relative file path under `root`; `/` in a key becomes a
//! directory level. Listings walk the deepest directory the prefix names, sort
//! keys bytewise, and use the last returned key as the continuation token.
//!
//! Copies land in a hidden temp sibling and are renamed into place, so a
//! destination is never observed half-written. Deletes prune directories left
//! empty so that a renamed folder disappears the way it does in a real bucket.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::{ListPage, ObjectEntry, ObjectStore, StoreError, effective_page_size};
use crate::platform::tmp_sibling_name;

/// Prefix shared by in-flight copy temp files; never surfaced as keys.
const TEMP_PREFIX: &str = ".keymove.";

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`. The directory must already exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let meta = fs::metadata(&root).map_err(StoreError::io("open store root", &root.display().to_string()))?;
        if !meta.is_dir() {
            return Err(StoreError::Backend(format!(
                "store root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto a path under the root, rejecting anything that could escape it.
    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if key.is_empty() {
            return Err(invalid("empty key"));
        }
        if key.ends_with('/') {
            return Err(invalid("folder markers cannot be stored as files"));
        }
        let rel = Path::new(key);
        for comp in rel.components() {
            match comp {
                Component::Normal(name) => {
                    if name.to_string_lossy().starts_with(TEMP_PREFIX) {
                        return Err(invalid("reserved name"));
                    }
                }
                _ => return Err(invalid("only plain relative segments are allowed")),
            }
        }
        Ok(self.root.join(rel))
    }

    /// Key for a file found under the root (segments joined with `/`).
    fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for comp in rel.components() {
            match comp {
                Component::Normal(name) => parts.push(name.to_str()?.to_string()),
                _ => return None,
            }
        }
        Some(parts.join("/"))
    }

    /// Deepest directory guaranteed to contain every key starting with `prefix`.
    fn walk_base(&self, prefix: &str) -> PathBuf {
        match prefix.rfind('/') {
            Some(idx) => self.root.join(&prefix[..idx]),
            None => self.root.clone(),
        }
    }

    /// Remove now-empty parents of `path`, stopping at the root.
    fn prune_empty_parents(&self, path: &Path) {
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.root || !d.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(d).is_err() {
                break;
            }
            trace!(dir = %d.display(), "pruned empty directory");
            dir = d.parent();
        }
    }
}

impl ObjectStore for LocalStore {
    fn list(
        &self,
        prefix: &str,
        max_keys: Option<usize>,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let limit = effective_page_size(max_keys);
        let base = self.walk_base(prefix);
        if !base.is_dir() {
            return Ok(ListPage::default());
        }

        let mut found: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(&base).follow_links(false) {
            let entry = entry.map_err(|e| {
                StoreError::Backend(format!("walk '{}': {e}", base.display()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                continue;
            }
            let Some(key) = self.key_for(entry.path()) else {
                debug!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }
            if let Some(after) = continuation_token
                && key.as_str() <= after
            {
                continue;
            }
            found.push((key, entry.into_path()));
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));

        let truncated = found.len() > limit;
        found.truncate(limit);
        let next_continuation_token = if truncated {
            found.last().map(|(k, _)| k.clone())
        } else {
            None
        };

        let mut entries = Vec::with_capacity(found.len());
        for (key, path) in found {
            let meta = match fs::metadata(&path) {
                Ok(m) => m,
                // Deleted between the walk and the stat; the listing is a live snapshot.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::io("stat object", &key)(e)),
            };
            entries.push(ObjectEntry {
                size: Some(meta.len()),
                last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                etag: None,
                storage_class: None,
                content_type: None,
                key,
            });
        }

        Ok(ListPage {
            entries,
            next_continuation_token,
        })
    }

    fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StoreError> {
        let src = self.object_path(src_key)?;
        let dst = self.object_path(dst_key)?;
        if !src.is_file() {
            return Err(StoreError::NotFound(src_key.to_string()));
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(StoreError::io("create destination folder", dst_key))?;
        }

        let tmp = tmp_sibling_name(&dst, "copy");
        if let Err(e) = fs::copy(&src, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io("copy object", src_key)(e));
        }
        if let Err(e) = fs::rename(&tmp, &dst) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io("place copied object", dst_key)(e));
        }
        trace!(src = src_key, dst = dst_key, "copied object");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::io("delete object", key)(e)),
        }
        self.prune_empty_parents(&path);
        trace!(key, "deleted object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rejects_keys_that_escape_the_root() {
        let td = tempdir().unwrap();
        let store = LocalStore::open(td.path()).unwrap();
        for bad in ["../x", "/etc/passwd", "a/../../b", "dir/"] {
            assert!(
                matches!(store.object_path(bad), Err(StoreError::InvalidKey { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn walk_base_uses_last_delimiter() {
        let td = tempdir().unwrap();
        let store = LocalStore::open(td.path()).unwrap();
        assert_eq!(store.walk_base("logs/20"), td.path().join("logs"));
        assert_eq!(store.walk_base("logs"), td.path().to_path_buf());
    }
}
