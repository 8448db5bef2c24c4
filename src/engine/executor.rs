//! Two-phase migration executor.
//! Phase 1 copies every pair in parallel and must fully succeed before Phase 2
//! deletes any source. Both phases collect every failure instead of stopping at the first.

use rayon::ThreadPool;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

use super::MigrationResult;
use super::plan::{MigrationPair, MigrationPlan};
use crate::errors::{PairFailure, RenameError};
use crate::shutdown::CancelToken;
use crate::store::ObjectStore;

/// Outcome of the copy phase.
pub(crate) struct CopyPhase {
    pub failures: Vec<PairFailure>,
    pub copied: usize,
}

/// Copy every pair on `pool`. Pairs not yet started when `cancel` fires are skipped.
pub(crate) fn run_copies(
    pool: &ThreadPool,
    store: &dyn ObjectStore,
    pairs: &[MigrationPair],
    cancel: &CancelToken,
) -> CopyPhase {
    let copied = AtomicUsize::new(0);
    let failures = pool.install(|| {
        pairs
            .par_iter()
            .filter_map(|pair| {
                if cancel.is_cancelled() {
                    return None;
                }
                match store.copy(&pair.source, &pair.destination) {
                    Ok(()) => {
                        copied.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                    Err(error) => {
                        warn!(src = %pair.source, dst = %pair.destination, error = %error, "copy failed");
                        Some(PairFailure {
                            pair: pair.clone(),
                            error,
                        })
                    }
                }
            })
            .collect()
    });
    CopyPhase {
        failures,
        copied: copied.into_inner(),
    }
}

/// Delete the source of every pair on `pool`, returning the pairs whose delete failed.
pub(crate) fn run_deletes(
    pool: &ThreadPool,
    store: &dyn ObjectStore,
    pairs: &[MigrationPair],
) -> Vec<PairFailure> {
    pool.install(|| {
        pairs
            .par_iter()
            .filter_map(|pair| match store.delete(&pair.source) {
                Ok(()) => None,
                Err(error) => {
                    warn!(src = %pair.source, dst = %pair.destination, error = %error, "delete of source failed");
                    Some(PairFailure {
                        pair: pair.clone(),
                        error,
                    })
                }
            })
            .collect()
    })
}

/// Apply `plan` against `store`.
///
/// - Any copy failure: `CopyFailed`, no deletes issued, every source intact.
/// - Cancelled during copies: `Cancelled`, no deletes issued.
/// - Any delete failure: `PartialMigration`; the failed pairs exist at both keys.
///
/// Once the delete phase starts it runs to completion even if `cancel` fires.
pub fn execute(
    pool: &ThreadPool,
    store: &dyn ObjectStore,
    plan: MigrationPlan,
    cancel: &CancelToken,
) -> Result<MigrationResult, RenameError> {
    let total = plan.len();
    info!(kind = %plan.kind(), from = plan.from(), to = plan.to(), total, "copy phase started");

    let copies = run_copies(pool, store, plan.pairs(), cancel);
    if !copies.failures.is_empty() {
        return Err(RenameError::CopyFailed {
            failures: copies.failures,
            copied: copies.copied,
            total,
        });
    }
    if cancel.is_cancelled() {
        return Err(RenameError::Cancelled {
            copied: copies.copied,
            total,
        });
    }

    info!(from = plan.from(), to = plan.to(), total, "all copies done, delete phase started");
    let failures = run_deletes(pool, store, plan.pairs());
    if !failures.is_empty() {
        return Err(RenameError::PartialMigration {
            moved: total - failures.len(),
            failures,
            total,
        });
    }

    let result = MigrationResult {
        kind: plan.kind(),
        from: plan.from().to_string(),
        to: plan.to().to_string(),
        moved_count: total,
    };
    info!(moved = total, "{}", result.summary());
    Ok(result)
}
