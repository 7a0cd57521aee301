//! The resolver context: a per-call cache of open back ends (spec.md
//! component K).
//!
//! Grounded on `dfvfs/resolver/context.py::Context`: file systems and
//! file-like objects are expensive to open (they may themselves open a
//! chain of parents), so a `Context` is threaded through a resolve call
//! and remembers what's already open, keyed by the path spec's
//! `comparable()` string. Entries are reference counted rather than
//! dropped the moment a caller is done with them, so sibling lookups
//! (e.g. opening `/p1` and `/p2` of the same partition table) reuse the
//! one open volume system instead of re-parsing it.
//!
//! Capacity is bounded: when the cache is full and every cached entry is
//! still referenced, insertion fails with [`CacheFullError`] rather than
//! silently evicting something still in use (dfvfs's real behavior —
//! this is why the cache isn't just a `moka` LRU, which would evict
//! silently instead).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::CacheFullError;
use crate::io::FileLikeObject;
use crate::vfs::FileSystem;

const DEFAULT_CAPACITY: usize = 16;

struct CacheEntry<T> {
    value: T,
    ref_count: usize,
}

struct ObjectCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion order, oldest first; doubles as the LIFO teardown order
    /// when reversed.
    order: Vec<String>,
    capacity: usize,
}

impl<T> ObjectCache<T> {
    fn new(capacity: usize) -> Self {
        ObjectCache { entries: HashMap::new(), order: Vec::new(), capacity }
    }

    fn get(&mut self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        let entry = self.entries.get_mut(key)?;
        entry.ref_count += 1;
        Some(entry.value.clone())
    }

    fn insert(&mut self, key: String, value: T) -> Result<(), CacheFullError> {
        if self.entries.contains_key(&key) {
            return Ok(());
        }
        if self.entries.len() >= self.capacity {
            let evictable = self
                .order
                .iter()
                .position(|k| self.entries.get(k).map(|e| e.ref_count == 0).unwrap_or(true));
            match evictable {
                Some(pos) => {
                    let evicted = self.order.remove(pos);
                    self.entries.remove(&evicted);
                }
                None => return Err(CacheFullError { capacity: self.capacity }),
            }
        }
        self.entries.insert(key.clone(), CacheEntry { value, ref_count: 0 });
        self.order.push(key);
        Ok(())
    }

    fn release(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.ref_count = entry.ref_count.saturating_sub(1);
        }
    }

    /// Drains every entry in LIFO order (most-recently-opened first),
    /// the order in which nested back ends must be torn down: a TAR
    /// file system must close before the GZIP stream it reads from.
    fn drain_lifo(&mut self) -> Vec<T> {
        let mut drained = Vec::with_capacity(self.order.len());
        while let Some(key) = self.order.pop() {
            if let Some(entry) = self.entries.remove(&key) {
                drained.push(entry.value);
            }
        }
        drained
    }
}

/// Per-resolve-call cache of open file systems and file-like objects.
pub struct Context {
    file_systems: Mutex<ObjectCache<Arc<Mutex<dyn FileSystem>>>>,
    file_objects: Mutex<ObjectCache<Arc<Mutex<dyn FileLikeObject>>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Context {
            file_systems: Mutex::new(ObjectCache::new(capacity)),
            file_objects: Mutex::new(ObjectCache::new(capacity)),
        }
    }

    pub fn get_file_system(&self, key: &str) -> Option<Arc<Mutex<dyn FileSystem>>> {
        self.file_systems.lock().unwrap().get(key)
    }

    pub fn cache_file_system(&self, key: String, file_system: Arc<Mutex<dyn FileSystem>>) -> Result<(), CacheFullError> {
        self.file_systems.lock().unwrap().insert(key, file_system)
    }

    pub fn release_file_system(&self, key: &str) {
        self.file_systems.lock().unwrap().release(key);
    }

    pub fn get_file_object(&self, key: &str) -> Option<Arc<Mutex<dyn FileLikeObject>>> {
        self.file_objects.lock().unwrap().get(key)
    }

    pub fn cache_file_object(&self, key: String, file_object: Arc<Mutex<dyn FileLikeObject>>) -> Result<(), CacheFullError> {
        self.file_objects.lock().unwrap().insert(key, file_object)
    }

    pub fn release_file_object(&self, key: &str) {
        self.file_objects.lock().unwrap().release(key);
    }

    /// Closes every cached file system in LIFO order. File-like objects
    /// have no explicit close step; dropping the last `Arc` is enough.
    pub fn close_all(&self) -> Result<(), crate::error::Error> {
        let drained = self.file_systems.lock().unwrap().drain_lifo();
        for file_system in drained {
            file_system.lock().unwrap().close()?;
        }
        self.file_objects.lock().unwrap().drain_lifo();
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        let _ = self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::InMemoryFileObject;

    #[test]
    fn caches_and_releases_a_file_object() {
        let context = Context::new();
        let obj: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(InMemoryFileObject::new(vec![1, 2, 3])));
        context.cache_file_object("k".to_string(), Arc::clone(&obj)).unwrap();
        assert!(context.get_file_object("k").is_some());
        context.release_file_object("k");
    }

    #[test]
    fn full_cache_with_all_entries_referenced_errors() {
        let context = Context::with_capacity(1);
        let a: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(InMemoryFileObject::new(vec![])));
        context.cache_file_object("a".to_string(), a).unwrap();
        context.get_file_object("a").unwrap();

        let b: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(InMemoryFileObject::new(vec![])));
        assert!(context.cache_file_object("b".to_string(), b).is_err());
    }

    #[test]
    fn full_cache_with_unreferenced_entry_evicts_it() {
        let context = Context::with_capacity(1);
        let a: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(InMemoryFileObject::new(vec![])));
        context.cache_file_object("a".to_string(), a).unwrap();

        let b: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(InMemoryFileObject::new(vec![])));
        assert!(context.cache_file_object("b".to_string(), b).is_ok());
        assert!(context.get_file_object("a").is_none());
    }
}
