// Cache module - process-wide memoization keyed by input identity
//
// Each key is initialized at most once per Memo. Failed initializations are
// not stored and leave no entry behind, so a later call may retry. Entries
// live until the Memo is dropped.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::FeatureTable;
use crate::error::DatasetError;

/// Memoization wrapper handed to callers that repeatedly load the same input
pub struct Memo<K, V> {
    entries: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K: Eq + Hash + Clone, V> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, running `init` on first use
    ///
    /// Concurrent callers for the same key block until one `init` finishes.
    pub fn get_or_try_init<E, F>(&self, key: &K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(key.clone()).or_default())
        };
        let result = cell.get_or_try_init(|| init(key).map(Arc::new)).cloned();
        if result.is_err() {
            self.evict_empty(key, &cell);
        }
        result
    }

    /// Drop the entry for `key` if it is still `cell` and was never initialized
    fn evict_empty(&self, key: &K, cell: &Arc<OnceCell<Arc<V>>>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let stale = entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && current.get().is_none());
        if stale {
            entries.remove(key);
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of initialized entries
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parsed feature tables keyed by source file
pub type DatasetCache = Memo<PathBuf, FeatureTable>;

impl DatasetCache {
    /// Load `path` through the cache
    pub fn load(&self, path: &Path) -> Result<Arc<FeatureTable>, DatasetError> {
        self.get_or_try_init(&path.to_path_buf(), |path| FeatureTable::load(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_initializes_once() {
        let memo: Memo<String, usize> = Memo::new();
        let calls = AtomicUsize::new(0);
        let load = |key: &String| -> Result<usize, ()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(key.len())
        };

        let first = memo.get_or_try_init(&"abc".to_string(), load).unwrap();
        let second = memo.get_or_try_init(&"abc".to_string(), load).unwrap();
        assert_eq!(*first, 3);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let memo: Memo<u32, u32> = Memo::new();
        let err: Result<Arc<u32>, &str> = memo.get_or_try_init(&1, |_| Err("boom"));
        assert!(err.is_err());
        assert!(memo.get(&1).is_none());
        assert!(memo.is_empty());

        for key in 2..50 {
            let _: Result<Arc<u32>, &str> = memo.get_or_try_init(&key, |_| Err("boom"));
        }
        assert!(memo.entries.lock().unwrap().is_empty());

        let ok: Result<Arc<u32>, &str> = memo.get_or_try_init(&1, |k| Ok(k + 1));
        assert_eq!(*ok.unwrap(), 2);
        assert_eq!(memo.get(&1).as_deref(), Some(&2));
    }

    #[test]
    fn test_shared_across_threads() {
        let memo: Arc<Memo<u32, u32>> = Arc::new(Memo::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    let value = memo
                        .get_or_try_init(&7, |k| -> Result<u32, ()> {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(k * 6)
                        })
                        .unwrap();
                    *value
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dataset_cache_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        std::fs::write(&path, r#"{"data/kick/a.wav": {"duration": 0.25}}"#).unwrap();

        let cache = DatasetCache::new();
        let first = cache.load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.class_names, vec!["kick"]);
    }
}
