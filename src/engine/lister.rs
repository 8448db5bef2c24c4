//! Full enumeration of a prefix across paged listings.

use tracing::debug;

use crate::store::{ObjectEntry, ObjectStore, StoreError};

/// Every entry whose key starts with `prefix`, in store order.
/// Follows continuation tokens until the store reports none; an empty result is not an error.
pub fn list_all(
    store: &dyn ObjectStore,
    prefix: &str,
    page_size: usize,
) -> Result<Vec<ObjectEntry>, StoreError> {
    let mut entries = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.list(prefix, Some(page_size), token.as_deref())?;
        pages += 1;
        debug!(prefix, page = pages, returned = page.entries.len(), "listed page");
        entries.extend(page.entries);

        match page.next_continuation_token {
            // A token that does not advance would page forever.
            Some(next) if token.as_deref() == Some(next.as_str()) => {
                return Err(StoreError::Backend(format!(
                    "listing of '{prefix}' returned the same continuation token twice"
                )));
            }
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(entries)
}

/// Keys only; see [`list_all`].
pub fn list_all_keys(
    store: &dyn ObjectStore,
    prefix: &str,
    page_size: usize,
) -> Result<Vec<String>, StoreError> {
    Ok(list_all(store, prefix, page_size)?
        .into_iter()
        .map(|e| e.key)
        .collect())
}
