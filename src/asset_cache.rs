//! Lazy, concurrency-safe cache for expensive per-resource artifacts
//! (icons, previews), keyed by resource id.
//!
//! Reads take a shared lock and return immediately on a hit. On a miss
//! the artifact is computed outside any lock; only the final insert takes
//! the exclusive write lock. Two callers racing on the same miss both
//! compute and the second insert idempotently overwrites — accepted, not
//! a bug. Entries survive catalog rebuilds; [`AssetCache::retain`]
//! offers opportunistic eviction of ids that vanished.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use tracing::debug;

/// Computes an artifact for a resource id. May be slow (disk, OS icon
/// services); never called while a cache lock is held.
pub type AssetLoader<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;

pub struct AssetCache<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
    loader: AssetLoader<T>,
}

impl<T: Send + Sync + 'static> AssetCache<T> {
    pub fn new(loader: AssetLoader<T>) -> Self {
        AssetCache {
            entries: RwLock::new(HashMap::new()),
            loader,
        }
    }

    /// Cached artifact without computing anything on a miss.
    pub fn peek(&self, id: &str) -> Option<Arc<T>> {
        self.entries.read().get(id).cloned()
    }

    /// Get the artifact, computing and storing it on a miss.
    ///
    /// Returns None when the loader cannot produce one (e.g. the resource
    /// vanished); misses are not negatively cached, so a later call
    /// retries.
    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        if let Some(hit) = self.peek(id) {
            return Some(hit);
        }

        // Compute outside any lock; the write lock scopes strictly to the
        // store mutation.
        let artifact = Arc::new((self.loader)(id)?);
        self.entries
            .write()
            .insert(id.to_string(), Arc::clone(&artifact));
        Some(artifact)
    }

    /// Get the artifact off the calling thread, delivering over a channel.
    /// Many concurrent fetches for the same id are safe.
    pub fn fetch(self: &Arc<Self>, id: &str) -> Receiver<Option<Arc<T>>> {
        let (tx, rx) = channel();
        let cache = Arc::clone(self);
        let id = id.to_string();
        std::thread::spawn(move || {
            let _ = tx.send(cache.get(&id));
        });
        rx
    }

    /// Evict entries whose id fails the predicate (e.g. ids absent from
    /// the current catalog). Optional: stale entries are harmless.
    pub fn retain<F: Fn(&str) -> bool>(&self, live: F) {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|id, _| live(id));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "Evicted stale asset cache entries");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
