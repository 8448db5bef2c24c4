use keymove::engine::classify;
use keymove::{MemoryStore, RenameError, RenameTarget};

fn store_with(keys: &[&str]) -> MemoryStore {
    let store = MemoryStore::new();
    for k in keys {
        store.put(*k, format!("body of {k}"));
    }
    store
}

#[test]
fn lone_key_is_a_single_file() {
    let store = store_with(&["a/b.txt", "a/b.txt.bak", "other/x"]);
    let target = classify(&store, "a/b.txt").unwrap();
    assert_eq!(
        target,
        RenameTarget::SingleFile {
            key: "a/b.txt".into()
        }
    );
}

#[test]
fn prefix_with_children_is_a_folder() {
    let store = store_with(&["images/1.png", "images/2.png"]);
    let target = classify(&store, "images").unwrap();
    assert_eq!(
        target,
        RenameTarget::FolderPrefix {
            prefix: "images/".into()
        }
    );
}

#[test]
fn folder_wins_over_exact_name_collision() {
    let store = store_with(&["images", "images/1.png"]);
    let target = classify(&store, "images").unwrap();
    assert!(matches!(target, RenameTarget::FolderPrefix { ref prefix } if prefix == "images/"));
}

#[test]
fn trailing_slash_is_accepted() {
    let store = store_with(&["logs/2024/a.txt"]);
    let target = classify(&store, "logs/2024/").unwrap();
    assert_eq!(target.source(), "logs/2024/");
}

#[test]
fn sibling_with_longer_name_is_not_a_match() {
    // "report" only prefixes "report.pdf", which is neither exact nor a child.
    let store = store_with(&["report.pdf"]);
    let err = classify(&store, "report").unwrap_err();
    assert!(matches!(err, RenameError::NotFound(k) if k == "report"));
}

#[test]
fn missing_key_is_not_found_and_read_only() {
    let store = store_with(&["a/1"]);
    let err = classify(&store, "nope").unwrap_err();
    assert!(matches!(err, RenameError::NotFound(_)));
    assert_eq!(store.list_calls(), 2, "exactly two probes");
    assert_eq!(store.copy_calls(), 0);
    assert_eq!(store.delete_calls(), 0);
}
