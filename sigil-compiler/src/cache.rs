//! Compiled schema caching.
//!
//! Every model is compiled at most once per [`SchemaCache`]. While a model is
//! being compiled its entry is an in-progress marker, so a reference back to it
//! (directly or through other models) is seen as a cycle rather than recursed
//! into.
//!
//! Reads of completed entries only take a shared lock. Compilations that can
//! insert entries are serialized on a separate compile lock, so concurrent
//! callers never observe a half-built schema or race on the same name.

use parking_lot::{Mutex, MutexGuard, RwLock};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::sync::Arc;

use crate::output::CompiledSchema;

// ============================================================================
// Schema Cache
// ============================================================================

/// The state of one model in the cache.
#[derive(Debug, Clone)]
enum CacheEntry {
    InProgress,
    Compiled(Arc<CompiledSchema>),
}

/// Result of looking a model up in the cache.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// The model is fully compiled.
    Hit(Arc<CompiledSchema>),
    /// The model is currently being compiled further up the stack.
    InProgress,
    /// The model has not been seen.
    Miss,
}

/// A cache of compiled schemas, keyed by model name.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<SmolStr, CacheEntry>>,
    stats: RwLock<CacheStats>,
    compile_lock: Mutex<()>,
}

/// Statistics for the schema cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of lookups answered from a completed entry.
    pub hits: u64,
    /// Number of models compiled.
    pub misses: u64,
    /// Number of cycle stubs emitted.
    pub stubs: u64,
    /// Number of schemas currently cached.
    pub cached_count: usize,
}

impl CacheStats {
    /// Get the cache hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl SchemaCache {
    /// Create a new empty schema cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
            ..Self::default()
        }
    }

    /// Get a completed schema without touching the statistics.
    pub fn get(&self, name: &str) -> Option<Arc<CompiledSchema>> {
        match self.entries.read().get(name) {
            Some(CacheEntry::Compiled(schema)) => Some(Arc::clone(schema)),
            _ => None,
        }
    }

    /// Look a model up, counting completed entries as hits.
    pub fn lookup(&self, name: &str) -> Lookup {
        let lookup = match self.entries.read().get(name) {
            Some(CacheEntry::Compiled(schema)) => Lookup::Hit(Arc::clone(schema)),
            Some(CacheEntry::InProgress) => Lookup::InProgress,
            None => Lookup::Miss,
        };
        if matches!(lookup, Lookup::Hit(_)) {
            self.stats.write().hits += 1;
        }
        lookup
    }

    /// Check if a completed schema is cached.
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.entries.read().get(name), Some(CacheEntry::Compiled(_)))
    }

    /// Mark a model as being compiled. Counts as a miss.
    pub(crate) fn begin(&self, name: &SmolStr) {
        self.entries.write().insert(name.clone(), CacheEntry::InProgress);
        self.stats.write().misses += 1;
    }

    /// Replace the in-progress marker with the finished schema.
    pub(crate) fn complete(&self, name: &SmolStr, schema: Arc<CompiledSchema>) {
        self.entries
            .write()
            .insert(name.clone(), CacheEntry::Compiled(schema));
    }

    /// Record that a cycle was cut with a stub.
    pub(crate) fn record_stub(&self) {
        self.stats.write().stubs += 1;
    }

    /// Take the compile lock. Only one compilation runs at a time per cache.
    pub(crate) fn lock_compilation(&self) -> MutexGuard<'_, ()> {
        self.compile_lock.lock()
    }

    /// Drop in-progress markers left behind by an interrupted compilation.
    ///
    /// Must be called with the compile lock held and before any new marker is set.
    pub(crate) fn discard_in_progress(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| matches!(entry, CacheEntry::Compiled(_)));
        before - entries.len()
    }

    /// Clear the cache.
    pub fn clear(&self) {
        let _guard = self.lock_compilation();
        self.entries.write().clear();
        self.stats.write().cached_count = 0;
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        stats.cached_count = self.len();
        stats
    }

    /// Get the number of completed schemas.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Compiled(_)))
            .count()
    }

    /// Check if the cache holds no completed schemas.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a compiled schema from the cache.
    pub fn remove(&self, name: &str) -> bool {
        let _guard = self.lock_compilation();
        self.entries.write().remove(name).is_some()
    }

    /// Names of all completed schemas, in no particular order.
    pub fn names(&self) -> Vec<SmolStr> {
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| matches!(entry, CacheEntry::Compiled(_)))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
