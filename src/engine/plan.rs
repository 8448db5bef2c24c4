//! Migration plans: the ordered (source, destination) pairs one rename will move.

use std::collections::HashSet;
use std::fmt;

use super::classify::{RenameTarget, TargetKind};
use super::key::{normalize_prefix, substitute_prefix};
use crate::errors::RenameError;

/// One unit of work: copy `source` to `destination`, then delete `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MigrationPair {
    pub source: String,
    pub destination: String,
}

impl MigrationPair {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for MigrationPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Immutable plan built once per rename and consumed by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    kind: TargetKind,
    from: String,
    to: String,
    pairs: Vec<MigrationPair>,
}

impl MigrationPlan {
    /// Plan for renaming one object.
    pub fn single_file(old_key: &str, new_key: &str) -> Result<Self, RenameError> {
        if old_key == new_key {
            return Err(RenameError::InvalidRequest(format!(
                "old and new key are the same: {old_key}"
            )));
        }
        Ok(Self {
            kind: TargetKind::SingleFile,
            from: old_key.to_string(),
            to: new_key.to_string(),
            pairs: vec![MigrationPair::new(old_key, new_key)],
        })
    }

    /// Plan for moving every `source_keys` entry from `old_prefix` to `new_prefix`.
    /// Both prefixes are normalized to end in `/`.
    pub fn folder(
        old_prefix: &str,
        new_prefix: &str,
        source_keys: Vec<String>,
    ) -> Result<Self, RenameError> {
        let from = normalize_prefix(old_prefix);
        let to = normalize_prefix(new_prefix);
        if from == to {
            return Err(RenameError::InvalidRequest(format!(
                "old and new prefix are the same: {from}"
            )));
        }
        if source_keys.is_empty() {
            return Err(RenameError::EmptyPlan(from));
        }

        let sources: HashSet<&str> = source_keys.iter().map(String::as_str).collect();
        let mut pairs = Vec::with_capacity(source_keys.len());
        for key in &source_keys {
            let destination = substitute_prefix(key, &from, &to).ok_or_else(|| {
                RenameError::InvalidRequest(format!("listed key '{key}' is outside prefix '{from}'"))
            })?;
            if sources.contains(destination.as_str()) {
                return Err(RenameError::InvalidRequest(format!(
                    "destination '{destination}' is also a source of this rename; \
                     renaming '{from}' to '{to}' would overwrite objects before they are copied"
                )));
            }
            pairs.push(MigrationPair::new(key.as_str(), destination));
        }

        Ok(Self {
            kind: TargetKind::FolderPrefix,
            from,
            to,
            pairs,
        })
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Old key (file) or normalized old prefix (folder).
    pub fn from(&self) -> &str {
        &self.from
    }

    /// New key (file) or normalized new prefix (folder).
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn pairs(&self) -> &[MigrationPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Turn a resolved target into a plan. `folder_keys` is the Lister's output and
/// is only consulted for folder targets.
pub fn build_plan(
    target: &RenameTarget,
    new_key: &str,
    folder_keys: Vec<String>,
) -> Result<MigrationPlan, RenameError> {
    match target {
        RenameTarget::SingleFile { key } => MigrationPlan::single_file(key, new_key),
        RenameTarget::FolderPrefix { prefix } => MigrationPlan::folder(prefix, new_key, folder_keys),
    }
}
