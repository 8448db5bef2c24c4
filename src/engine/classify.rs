//! File-versus-folder classification.
//!
//! The store has no directories: an object literally named `images` and a set
//! of objects under `images/` can coexist. Two read-only probes decide which
//! one a rename means, and folder semantics win a collision.

use std::fmt;
use tracing::debug;

use super::key::normalize_prefix;
use crate::errors::RenameError;
use crate::store::ObjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    SingleFile,
    FolderPrefix,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetKind::SingleFile => "file",
            TargetKind::FolderPrefix => "folder",
        })
    }
}

/// What a rename request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameTarget {
    /// One object stored under exactly this key.
    SingleFile { key: String },
    /// Every object under this normalized (`/`-terminated) prefix.
    FolderPrefix { prefix: String },
}

impl RenameTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            RenameTarget::SingleFile { .. } => TargetKind::SingleFile,
            RenameTarget::FolderPrefix { .. } => TargetKind::FolderPrefix,
        }
    }

    /// The key or prefix the rename starts from.
    pub fn source(&self) -> &str {
        match self {
            RenameTarget::SingleFile { key } => key,
            RenameTarget::FolderPrefix { prefix } => prefix,
        }
    }
}

/// Decide whether `old_key` names a single object or a folder.
pub fn classify(store: &dyn ObjectStore, old_key: &str) -> Result<RenameTarget, RenameError> {
    let probe = normalize_prefix(old_key);
    let has_children = !store.list(&probe, Some(1), None)?.entries.is_empty();

    // The exact key sorts first among keys it prefixes, so one entry is enough.
    let is_object = store
        .list(old_key, Some(1), None)?
        .entries
        .iter()
        .any(|e| e.key == old_key);

    debug!(key = old_key, has_children, is_object, "classified rename target");

    if has_children {
        Ok(RenameTarget::FolderPrefix { prefix: probe })
    } else if is_object {
        Ok(RenameTarget::SingleFile {
            key: old_key.to_string(),
        })
    } else {
        Err(RenameError::NotFound(old_key.to_string()))
    }
}
