//! Rename engine.
//!
//! Turns `rename(old, new, type_hint?)` into a safe migration over a flat object store:
//! - classify the old key as a single object or a folder prefix,
//! - enumerate every affected key across paged listings,
//! - build an immutable plan of (source, destination) pairs,
//! - copy every pair, and only when all copies succeeded, delete every source.
//!
//! Two renames running at the same time over overlapping prefixes are not
//! coordinated; callers must serialize those themselves.

mod classify;
mod executor;
mod key;
mod lister;
mod plan;
mod reconcile;

pub use classify::{RenameTarget, TargetKind, classify};
pub use executor::execute;
pub use key::{normalize_prefix, substitute_prefix};
pub use lister::{list_all, list_all_keys};
pub use plan::{MigrationPair, MigrationPlan, build_plan};
pub use reconcile::ReconcileReport;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::errors::RenameError;
use crate::shutdown::CancelToken;
use crate::store::{MAX_PAGE_SIZE, ObjectStore};
use key::require_key;

pub const DEFAULT_CONCURRENCY: usize = 16;

/// Explicit caller intent that skips classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    File,
    Folder,
}

impl FromStr for TypeHint {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(TypeHint::File),
            "folder" => Ok(TypeHint::Folder),
            _ => Err(format!("invalid type '{s}': expected 'file' or 'folder'")),
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeHint::File => "file",
            TypeHint::Folder => "folder",
        })
    }
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Worker threads issuing store calls within a phase.
    pub concurrency: usize,
    /// Keys requested per listing page.
    pub page_size: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            concurrency: cfg.concurrency,
            page_size: cfg.page_size,
        }
    }
}

/// Successful rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    pub kind: TargetKind,
    /// Old key (file) or normalized old prefix (folder).
    pub from: String,
    /// New key (file) or normalized new prefix (folder).
    pub to: String,
    pub moved_count: usize,
}

impl MigrationResult {
    pub fn summary(&self) -> String {
        match self.kind {
            TargetKind::SingleFile => format!("File renamed: {} -> {}", self.from, self.to),
            TargetKind::FolderPrefix => format!(
                "Renamed folder: {} -> {} ({} objects)",
                self.from, self.to, self.moved_count
            ),
        }
    }
}

impl fmt::Display for MigrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Rename engine bound to one injected store client.
pub struct RenameEngine {
    store: Arc<dyn ObjectStore>,
    options: EngineOptions,
    pool: ThreadPool,
    cancel: CancelToken,
}

impl fmt::Debug for RenameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameEngine")
            .field("options", &self.options)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RenameEngine {
    /// Build an engine with a dedicated worker pool of `options.concurrency` threads.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        options: EngineOptions,
    ) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.concurrency.max(1))
            .thread_name(|i| format!("keymove-worker-{i}"))
            .build()?;
        Ok(Self {
            store,
            options,
            pool,
            cancel: CancelToken::new(),
        })
    }

    /// Use `token` for cancellation instead of the engine's own.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle that cancels renames run by this engine.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Resolve what `old_key` denotes, honoring an explicit hint without probing.
    pub fn resolve(
        &self,
        old_key: &str,
        hint: Option<TypeHint>,
    ) -> Result<RenameTarget, RenameError> {
        match hint {
            Some(TypeHint::File) => Ok(RenameTarget::SingleFile {
                key: old_key.to_string(),
            }),
            Some(TypeHint::Folder) => Ok(RenameTarget::FolderPrefix {
                prefix: normalize_prefix(old_key),
            }),
            None => classify(self.store.as_ref(), old_key),
        }
    }

    /// Build the plan a rename would execute, without touching the store's contents.
    pub fn plan(
        &self,
        old_key: &str,
        new_key: &str,
        hint: Option<TypeHint>,
    ) -> Result<MigrationPlan, RenameError> {
        let old_key = require_key("old key", old_key)?;
        let new_key = require_key("new key", new_key)?;
        let target = self.resolve(old_key, hint)?;
        let folder_keys = match &target {
            RenameTarget::SingleFile { .. } => Vec::new(),
            RenameTarget::FolderPrefix { prefix } => {
                list_all_keys(self.store.as_ref(), prefix, self.options.page_size)?
            }
        };
        let plan = build_plan(&target, new_key, folder_keys)?;
        debug!(kind = %plan.kind(), pairs = plan.len(), "built migration plan");
        Ok(plan)
    }

    /// Rename a file or folder. Nothing is retried automatically; see
    /// [`RenameError::is_retryable`] for what a caller may safely re-run.
    #[instrument(skip(self), fields(concurrency = self.options.concurrency))]
    pub fn rename(
        &self,
        old_key: &str,
        new_key: &str,
        hint: Option<TypeHint>,
    ) -> Result<MigrationResult, RenameError> {
        let plan = self.plan(old_key, new_key, hint)?;
        execute(&self.pool, self.store.as_ref(), plan, &self.cancel)
    }

    /// Delete a single object. Deleting a key that does not exist succeeds.
    #[instrument(skip(self))]
    pub fn remove(&self, key: &str) -> Result<(), RenameError> {
        let key = require_key("key", key)?;
        self.store.delete(key)?;
        info!(key, "object deleted");
        Ok(())
    }
}
