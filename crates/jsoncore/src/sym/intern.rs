//! A process-wide cache that lets equal names from unrelated symbol tables
//! share one allocation.

use std::{
    collections::HashSet,
    sync::{Arc, LazyLock},
};

use parking_lot::Mutex;

/// The cache is cleared wholesale once it holds this many entries.
pub const MAX_INTERNED: usize = 180;

static GLOBAL: LazyLock<InternCache> = LazyLock::new(|| InternCache::new(MAX_INTERNED));

/// A bounded set of shared strings.
#[derive(Debug)]
pub struct InternCache {
    entries: Mutex<HashSet<Arc<str>>>,
    max_entries: usize,
}

impl InternCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashSet::with_capacity(max_entries)),
            max_entries,
        }
    }

    /// The cache used by symbol tables with interning enabled.
    #[must_use]
    pub fn global() -> &'static InternCache {
        &GLOBAL
    }

    /// Returns the shared instance equal to `name`, inserting it if absent.
    pub fn intern(&self, name: &str) -> Arc<str> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(name) {
            return existing.clone();
        }
        if entries.len() >= self.max_entries {
            tracing::trace!(entries = entries.len(), "intern cache full, clearing");
            entries.clear();
        }
        let shared: Arc<str> = Arc::from(name);
        entries.insert(shared.clone());
        shared
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Interns `name` in the global cache.
pub fn intern(name: &str) -> Arc<str> {
    InternCache::global().intern(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_shared_instance() {
        let cache = InternCache::new(4);
        let a = cache.intern("name");
        let b = cache.intern(&String::from("name"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn clears_when_full() {
        let cache = InternCache::new(2);
        let first = cache.intern("a");
        cache.intern("b");
        assert_eq!(cache.len(), 2);
        cache.intern("c");
        assert_eq!(cache.len(), 1);
        // "a" was evicted, so a new instance is created.
        assert!(!Arc::ptr_eq(&first, &cache.intern("a")));
    }
}
