use std::collections::HashSet;
use std::sync::Mutex;

use keymove::engine::{list_all, list_all_keys};
use keymove::{ListPage, MemoryStore, ObjectEntry, ObjectStore, StoreError};

/// Store that serves pre-scripted pages keyed by the token it expects.
struct ScriptedStore {
    pages: Vec<(Option<&'static str>, Vec<&'static str>, Option<&'static str>)>,
    seen_tokens: Mutex<Vec<Option<String>>>,
}

impl ObjectStore for ScriptedStore {
    fn list(
        &self,
        _prefix: &str,
        _max_keys: Option<usize>,
        token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        self.seen_tokens.lock().unwrap().push(token.map(str::to_string));
        let (_, keys, next) = self
            .pages
            .iter()
            .find(|(expected, _, _)| *expected == token)
            .ok_or_else(|| StoreError::Backend(format!("unexpected token {token:?}")))?;
        Ok(ListPage {
            entries: keys.iter().map(|k| ObjectEntry::new(*k)).collect(),
            next_continuation_token: next.map(str::to_string),
        })
    }

    fn copy(&self, _: &str, _: &str) -> Result<(), StoreError> {
        unreachable!("lister never copies")
    }

    fn delete(&self, _: &str) -> Result<(), StoreError> {
        unreachable!("lister never deletes")
    }
}

#[test]
fn three_pages_of_two_yield_all_six_keys() {
    let store = ScriptedStore {
        pages: vec![
            (None, vec!["p/1", "p/2"], Some("tok-a")),
            (Some("tok-a"), vec!["p/3", "p/4"], Some("tok-b")),
            (Some("tok-b"), vec!["p/5", "p/6"], None),
        ],
        seen_tokens: Mutex::new(Vec::new()),
    };
    let keys = list_all_keys(&store, "p/", 2).unwrap();
    assert_eq!(keys, ["p/1", "p/2", "p/3", "p/4", "p/5", "p/6"]);
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), 6, "no duplicates");
    assert_eq!(
        *store.seen_tokens.lock().unwrap(),
        vec![None, Some("tok-a".to_string()), Some("tok-b".to_string())]
    );
}

#[test]
fn store_order_is_preserved() {
    let store = ScriptedStore {
        pages: vec![
            (None, vec!["p/z", "p/a"], Some("next")),
            (Some("next"), vec!["p/m"], None),
        ],
        seen_tokens: Mutex::new(Vec::new()),
    };
    assert_eq!(list_all_keys(&store, "p/", 2).unwrap(), ["p/z", "p/a", "p/m"]);
}

#[test]
fn repeated_token_is_an_error_not_a_loop() {
    let store = ScriptedStore {
        pages: vec![
            (None, vec!["p/1"], Some("stuck")),
            (Some("stuck"), vec!["p/2"], Some("stuck")),
        ],
        seen_tokens: Mutex::new(Vec::new()),
    };
    let err = list_all(&store, "p/", 1).unwrap_err();
    assert!(err.to_string().contains("same continuation token"), "{err}");
}

#[test]
fn memory_store_pages_across_boundaries() {
    let store = MemoryStore::new().with_page_limit(2);
    for i in 0..6 {
        store.put(format!("data/{i}.bin"), vec![i as u8]);
    }
    store.put("data.bin", "sibling outside the prefix");
    store.put("datb/0", "after the prefix");

    let keys = list_all_keys(&store, "data/", 1000).unwrap();
    assert_eq!(keys.len(), 6);
    assert!(keys.iter().all(|k| k.starts_with("data/")));
    assert_eq!(store.list_calls(), 3);
}

#[test]
fn empty_prefix_is_an_empty_listing() {
    let store = MemoryStore::new();
    store.put("a/1", "x");
    assert!(list_all(&store, "b/", 10).unwrap().is_empty());
}
