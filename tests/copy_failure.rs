use std::sync::Arc;

use keymove::engine::list_all_keys;
use keymove::{EngineOptions, MemoryStore, RenameEngine, RenameError, StoreError};

fn seeded(n: usize) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for i in 0..n {
        store.put(format!("src/{i:02}.bin"), vec![i as u8; 4]);
    }
    store
}

#[test]
fn one_failed_copy_keeps_every_source() {
    let store = seeded(10);
    store.fail_copy_from("src/07.bin");
    let engine = RenameEngine::new(store.clone(), EngineOptions::default()).unwrap();

    let err = engine.rename("src", "dst", None).unwrap_err();
    let RenameError::CopyFailed {
        failures,
        copied,
        total,
    } = &err
    else {
        panic!("expected CopyFailed, got {err:?}");
    };
    assert_eq!(*total, 10);
    assert_eq!(*copied, 9);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].pair.source, "src/07.bin");
    assert_eq!(failures[0].pair.destination, "dst/07.bin");
    assert!(matches!(failures[0].error, StoreError::Backend(_)));

    assert_eq!(store.delete_calls(), 0);
    let remaining = list_all_keys(store.as_ref(), "src/", 1000).unwrap();
    assert_eq!(remaining.len(), 10);

    assert!(err.is_retryable());
    assert_eq!(err.moved_count(), 0);
    assert_eq!(err.pending_count(), 10);
    assert_eq!(err.code(), 5);
}

#[test]
fn every_failed_copy_is_reported() {
    let store = seeded(6);
    for k in ["src/01.bin", "src/03.bin", "src/05.bin"] {
        store.fail_copy_from(k);
    }
    let engine = RenameEngine::new(
        store.clone(),
        EngineOptions {
            concurrency: 3,
            page_size: 2,
        },
    )
    .unwrap();

    let err = engine.rename("src/", "dst/", None).unwrap_err();
    let mut failed: Vec<_> = err
        .failures()
        .iter()
        .map(|f| f.pair.source.clone())
        .collect();
    failed.sort();
    assert_eq!(failed, ["src/01.bin", "src/03.bin", "src/05.bin"]);
    assert_eq!(store.delete_calls(), 0);
}

#[test]
fn rerunning_after_copy_failure_completes() {
    let store = seeded(4);
    store.fail_copy_from("src/02.bin");
    let engine = RenameEngine::new(store.clone(), EngineOptions::default()).unwrap();
    assert!(engine.rename("src", "dst", None).is_err());

    store.clear_faults();
    // Copies are idempotent overwrites, so the whole rename can simply run again.
    let res = engine.rename("src", "dst", None).unwrap();
    assert_eq!(res.moved_count, 4);
    assert!(store.keys().iter().all(|k| k.starts_with("dst/")));
}
