//! In-process object store.
//! Keys are kept sorted so listings are deterministic; the continuation token is
//! the next key to return. Copy/delete failures can be injected per key, and
//! every mutating call is counted, which is what the engine tests lean on.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ListPage, ObjectEntry, ObjectStore, StoreError, effective_page_size};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    last_modified: DateTime<Utc>,
    content_type: Option<String>,
}

#[derive(Debug, Default)]
struct Faults {
    copy_sources: HashSet<String>,
    delete_keys: HashSet<String>,
}

/// Thread-safe in-memory bucket.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    faults: Mutex<Faults>,
    page_limit: Option<usize>,
    list_calls: AtomicUsize,
    copy_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every listing page at `limit` entries regardless of what the caller asks for.
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = Some(limit.max(1));
        self
    }

    /// Store (or overwrite) an object.
    pub fn put(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        let obj = StoredObject {
            body: body.into(),
            last_modified: Utc::now(),
            content_type: None,
        };
        self.lock_objects().insert(key.into(), obj);
    }

    /// Store an object with an explicit content type.
    pub fn put_with_content_type(
        &self,
        key: impl Into<String>,
        body: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) {
        let obj = StoredObject {
            body: body.into(),
            last_modified: Utc::now(),
            content_type: Some(content_type.into()),
        };
        self.lock_objects().insert(key.into(), obj);
    }

    /// Body of `key`, if present.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock_objects().get(key).map(|o| o.body.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock_objects().contains_key(key)
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock_objects().keys().cloned().collect()
    }

    /// Make every copy whose source is `src_key` fail.
    pub fn fail_copy_from(&self, src_key: impl Into<String>) {
        self.lock_faults().copy_sources.insert(src_key.into());
    }

    /// Make every delete of `key` fail.
    pub fn fail_delete_of(&self, key: impl Into<String>) {
        self.lock_faults().delete_keys.insert(key.into());
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        let mut f = self.lock_faults();
        f.copy_sources.clear();
        f.delete_keys.clear();
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn copy_calls(&self) -> usize {
        self.copy_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    // A poisoned lock only means another test thread panicked mid-call; the map is still usable.
    fn lock_objects(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ObjectStore for MemoryStore {
    fn list(
        &self,
        prefix: &str,
        max_keys: Option<usize>,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut limit = effective_page_size(max_keys);
        if let Some(cap) = self.page_limit {
            limit = limit.min(cap);
        }

        let start = match continuation_token {
            Some(token) if token < prefix => {
                return Err(StoreError::Backend(format!(
                    "continuation token '{token}' does not belong to prefix '{prefix}'"
                )));
            }
            Some(token) => Bound::Included(token.to_string()),
            None => Bound::Included(prefix.to_string()),
        };

        let objects = self.lock_objects();
        let mut matching = objects
            .range((start, Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix));

        let entries: Vec<ObjectEntry> = matching
            .by_ref()
            .take(limit)
            .map(|(k, o)| ObjectEntry {
                key: k.clone(),
                size: Some(o.body.len() as u64),
                last_modified: Some(o.last_modified),
                etag: None,
                storage_class: Some("STANDARD".to_string()),
                content_type: o.content_type.clone(),
            })
            .collect();
        let next_continuation_token = matching.next().map(|(k, _)| k.clone());

        Ok(ListPage {
            entries,
            next_continuation_token,
        })
    }

    fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StoreError> {
        self.copy_calls.fetch_add(1, Ordering::SeqCst);
        if self.lock_faults().copy_sources.contains(src_key) {
            return Err(StoreError::Backend(format!(
                "injected copy failure for '{src_key}'"
            )));
        }
        let mut objects = self.lock_objects();
        let mut obj = objects
            .get(src_key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(src_key.to_string()))?;
        obj.last_modified = Utc::now();
        objects.insert(dst_key.to_string(), obj);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.lock_faults().delete_keys.contains(key) {
            return Err(StoreError::Backend(format!(
                "injected delete failure for '{key}'"
            )));
        }
        self.lock_objects().remove(key);
        Ok(())
    }
}
