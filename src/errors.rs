//! Typed error definitions for keymove.
//! A small set of well-known rename outcomes so callers can decide between
//! retrying the whole rename and retrying only the outstanding deletes.

use std::fmt;
use thiserror::Error;

use crate::engine::MigrationPair;
use crate::store::StoreError;

/// One migration pair whose copy or delete failed.
#[derive(Debug)]
pub struct PairFailure {
    pub pair: MigrationPair,
    pub error: StoreError,
}

impl fmt::Display for PairFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pair, self.error)
    }
}

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("invalid rename request: {0}")]
    InvalidRequest(String),

    #[error("no file or folder found with key/prefix: {0}")]
    NotFound(String),

    #[error("no objects found with prefix: {0}")]
    EmptyPlan(String),

    /// Some copies failed; no source was deleted, so the whole rename can be retried.
    #[error(
        "copy failed for {} of {total} objects; 0 moved, {total} still pending at the old keys",
        .failures.len()
    )]
    CopyFailed {
        failures: Vec<PairFailure>,
        /// Copies that did succeed before the phase ended.
        copied: usize,
        total: usize,
    },

    /// Every copy succeeded but some deletes failed; those objects now exist at
    /// both keys and only the deletes need retrying.
    #[error(
        "delete failed for {} of {total} objects; {moved} moved, {} pending cleanup at the old keys",
        .failures.len(),
        .failures.len()
    )]
    PartialMigration {
        failures: Vec<PairFailure>,
        moved: usize,
        total: usize,
    },

    #[error("rename cancelled after {copied} of {total} copies; 0 moved, nothing was deleted")]
    Cancelled { copied: usize, total: usize },

    #[error("store request failed: {0}")]
    Store(#[from] StoreError),
}

impl RenameError {
    /// Stable process exit code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            RenameError::InvalidRequest(_) => 2,
            RenameError::NotFound(_) => 3,
            RenameError::EmptyPlan(_) => 4,
            RenameError::CopyFailed { .. } => 5,
            RenameError::PartialMigration { .. } => 6,
            RenameError::Store(_) => 7,
            RenameError::Cancelled { .. } => 130,
        }
    }

    /// Short machine-friendly label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RenameError::InvalidRequest(_) => "invalid_request",
            RenameError::NotFound(_) => "not_found",
            RenameError::EmptyPlan(_) => "empty_plan",
            RenameError::CopyFailed { .. } => "copy_failed",
            RenameError::PartialMigration { .. } => "partial_migration",
            RenameError::Cancelled { .. } => "cancelled",
            RenameError::Store(_) => "store",
        }
    }

    /// Pairs fully moved (copied and source deleted) before the error.
    pub fn moved_count(&self) -> usize {
        match self {
            RenameError::PartialMigration { moved, .. } => *moved,
            _ => 0,
        }
    }

    /// Pairs that still need attention after the error.
    pub fn pending_count(&self) -> usize {
        match self {
            RenameError::CopyFailed { total, .. } | RenameError::Cancelled { total, .. } => *total,
            RenameError::PartialMigration { failures, .. } => failures.len(),
            _ => 0,
        }
    }

    /// Failed pairs, if this error came from executing a plan.
    pub fn failures(&self) -> &[PairFailure] {
        match self {
            RenameError::CopyFailed { failures, .. }
            | RenameError::PartialMigration { failures, .. } => failures,
            _ => &[],
        }
    }

    /// True when re-running the whole rename is safe and sufficient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RenameError::CopyFailed { .. } | RenameError::Cancelled { .. } | RenameError::Store(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(src: &str, dst: &str) -> PairFailure {
        PairFailure {
            pair: MigrationPair::new(src, dst),
            error: StoreError::Backend("boom".into()),
        }
    }

    #[test]
    fn partial_migration_reports_moved_and_pending() {
        let err = RenameError::PartialMigration {
            failures: vec![failure("a/1", "b/1")],
            moved: 2,
            total: 3,
        };
        assert_eq!(err.moved_count(), 2);
        assert_eq!(err.pending_count(), 1);
        assert!(!err.is_retryable());
        let msg = err.to_string();
        assert!(msg.contains("2 moved"), "{msg}");
        assert!(msg.contains("1 pending"), "{msg}");
    }

    #[test]
    fn copy_failed_leaves_everything_pending() {
        let err = RenameError::CopyFailed {
            failures: vec![failure("a/1", "b/1")],
            copied: 2,
            total: 3,
        };
        assert_eq!(err.moved_count(), 0);
        assert_eq!(err.pending_count(), 3);
        assert!(err.is_retryable());
        assert_eq!(err.failures().len(), 1);
        assert_eq!(err.code(), 5);
    }
}
