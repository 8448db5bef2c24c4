use std::sync::Arc;

use keymove::{
    CancelToken, EngineOptions, ListPage, MemoryStore, ObjectStore, RenameEngine, RenameError,
    StoreError,
};

/// Fires the cancel token as soon as the first copy lands.
struct CancelOnFirstCopy {
    inner: MemoryStore,
    token: CancelToken,
}

impl ObjectStore for CancelOnFirstCopy {
    fn list(
        &self,
        prefix: &str,
        max_keys: Option<usize>,
        token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        self.inner.list(prefix, max_keys, token)
    }

    fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StoreError> {
        let out = self.inner.copy(src_key, dst_key);
        self.token.cancel();
        out
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}

#[test]
fn cancel_during_copies_issues_no_deletes() {
    let token = CancelToken::new();
    let inner = MemoryStore::new();
    for i in 0..8 {
        inner.put(format!("big/{i}"), "x");
    }
    let store = Arc::new(CancelOnFirstCopy {
        inner,
        token: token.clone(),
    });
    let engine = RenameEngine::new(
        store.clone(),
        EngineOptions {
            concurrency: 1,
            page_size: 1000,
        },
    )
    .unwrap()
    .with_cancel_token(token);

    let err = engine.rename("big", "small", None).unwrap_err();
    let RenameError::Cancelled { copied, total } = &err else {
        panic!("expected Cancelled, got {err:?}");
    };
    assert_eq!(*total, 8);
    assert!(*copied >= 1 && copied < total, "copied {copied}");
    assert_eq!(store.inner.delete_calls(), 0);
    assert_eq!(store.inner.copy_calls(), *copied);
    for i in 0..8 {
        assert!(store.inner.contains(&format!("big/{i}")));
    }
}

#[test]
fn already_cancelled_engine_copies_nothing() {
    let store = Arc::new(MemoryStore::new());
    store.put("a/1", "x");
    store.put("a/2", "y");
    let engine = RenameEngine::new(store.clone(), EngineOptions::default()).unwrap();
    engine.cancel_token().cancel();

    let err = engine.rename("a", "b", None).unwrap_err();
    assert!(matches!(err, RenameError::Cancelled { copied: 0, total: 2 }));
    assert_eq!(err.code(), 130);
    assert!(err.is_retryable());
    assert_eq!(store.copy_calls(), 0);
    assert_eq!(store.keys(), ["a/1", "a/2"]);
}
