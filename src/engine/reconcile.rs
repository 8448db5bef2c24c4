//! Cleanup after a partial migration.
//! Only deletes are re-attempted here. A source is removed only when its
//! destination exists and does not visibly differ from it (size, then etag
//! when the store reports both).

use std::collections::HashMap;
use tracing::{info, warn};

use super::RenameEngine;
use super::classify::RenameTarget;
use super::executor::run_deletes;
use super::key::require_key;
use super::lister::list_all;
use super::plan::{MigrationPair, build_plan};
use crate::errors::RenameError;
use crate::store::{ObjectEntry, ObjectStore, StoreError};

/// What a reconcile pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Sources deleted because their destination was present.
    pub cleaned: usize,
    /// Pairs whose destination is missing; their sources were left alone.
    pub pending: Vec<MigrationPair>,
    /// Pairs whose destination exists but differs from the source; both were left alone.
    pub diverged: Vec<MigrationPair>,
}

/// Entry stored at exactly `key`, if any.
fn exact_entry(store: &dyn ObjectStore, key: &str) -> Result<Option<ObjectEntry>, StoreError> {
    Ok(store
        .list(key, Some(1), None)?
        .entries
        .into_iter()
        .find(|e| e.key == key))
}

fn by_key(entries: Vec<ObjectEntry>) -> HashMap<String, ObjectEntry> {
    entries.into_iter().map(|e| (e.key.clone(), e)).collect()
}

fn conflicts<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x != y)
}

/// Unknown metadata on either side never counts as a difference.
fn same_content(src: &ObjectEntry, dst: &ObjectEntry) -> bool {
    !conflicts(&src.size, &dst.size) && !conflicts(&src.etag, &dst.etag)
}

impl RenameEngine {
    /// Re-attempt the source deletes of `pairs`, typically the failures carried by
    /// a `PartialMigration`. Returns how many deletes succeeded.
    pub fn retry_deletes(&self, pairs: &[MigrationPair]) -> Result<usize, RenameError> {
        let total = pairs.len();
        let failures = run_deletes(&self.pool, self.store.as_ref(), pairs);
        if failures.is_empty() {
            info!(cleaned = total, "retried deletes succeeded");
            return Ok(total);
        }
        Err(RenameError::PartialMigration {
            moved: total - failures.len(),
            failures,
            total,
        })
    }

    /// Rebuild the plan for `old_key -> new_key` from a fresh listing and delete
    /// every source whose destination already holds the same object.
    pub fn reconcile(&self, old_key: &str, new_key: &str) -> Result<ReconcileReport, RenameError> {
        let old_key = require_key("old key", old_key)?;
        let new_key = require_key("new key", new_key)?;
        let target = self.resolve(old_key, None)?;
        let page_size = self.options.page_size;
        let store = self.store.as_ref();

        let (plan, sources, present) = match &target {
            RenameTarget::SingleFile { key } => {
                let plan = build_plan(&target, new_key, Vec::new())?;
                let sources = by_key(exact_entry(store, key)?.into_iter().collect());
                let present = by_key(exact_entry(store, new_key)?.into_iter().collect());
                (plan, sources, present)
            }
            RenameTarget::FolderPrefix { prefix } => {
                let entries = list_all(store, prefix, page_size)?;
                let keys = entries.iter().map(|e| e.key.clone()).collect();
                let plan = build_plan(&target, new_key, keys)?;
                let present = by_key(list_all(store, plan.to(), page_size)?);
                (plan, by_key(entries), present)
            }
        };

        let mut ready = Vec::new();
        let mut pending = Vec::new();
        let mut diverged = Vec::new();
        for pair in plan.pairs() {
            let Some(dst) = present.get(&pair.destination) else {
                warn!(src = %pair.source, dst = %pair.destination, "destination missing; leaving source in place");
                pending.push(pair.clone());
                continue;
            };
            match sources.get(&pair.source) {
                Some(src) if !same_content(src, dst) => {
                    warn!(
                        src = %pair.source,
                        dst = %pair.destination,
                        src_size = ?src.size,
                        dst_size = ?dst.size,
                        "destination differs from source; leaving both in place"
                    );
                    diverged.push(pair.clone());
                }
                _ => ready.push(pair.clone()),
            }
        }

        let cleaned = self.retry_deletes(&ready)?;
        info!(
            cleaned,
            pending = pending.len(),
            diverged = diverged.len(),
            "reconcile finished"
        );
        Ok(ReconcileReport {
            cleaned,
            pending,
            diverged,
        })
    }
}
