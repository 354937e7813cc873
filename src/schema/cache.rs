//! Bounded, concurrently readable store of compiled schemas.
//!
//! Hits only take the shared lock; recency is tracked with a per-entry atomic
//! tick so readers never contend on the write lock. A miss compiles outside any
//! lock and installs the result under a short exclusive lock. Two tasks missing
//! on the same key may both compile; the first insert wins and the loser adopts
//! the installed artifact.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{CompiledSchema, SchemaError};

pub const DEFAULT_SCHEMA_CACHE_CAPACITY: usize = 128;

struct CacheEntry {
    schema: Arc<dyn CompiledSchema>,
    last_used: AtomicU64,
}

/// Least-recently-used cache from schema fingerprint to compiled schema.
pub struct SchemaCache {
    capacity: usize,
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: AtomicU64,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_CACHE_CAPACITY)
    }
}

impl SchemaCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(HashMap::with_capacity(capacity)),
            clock: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn CompiledSchema>> {
        let entries = self.entries.read();
        entries.get(key).map(|entry| {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            Arc::clone(&entry.schema)
        })
    }

    /// Install `schema` under `key`, returning whichever artifact ends up cached.
    pub fn insert(&self, key: String, schema: Arc<dyn CompiledSchema>) -> Arc<dyn CompiledSchema> {
        let now = self.tick();
        let mut entries = self.entries.write();

        if let Some(existing) = entries.get(&key) {
            existing.last_used.store(now, Ordering::Relaxed);
            return Arc::clone(&existing.schema);
        }

        if entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                log::debug!("evicting compiled schema {}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                schema: Arc::clone(&schema),
                last_used: AtomicU64::new(now),
            },
        );
        schema
    }

    /// Return the cached schema for `key`, compiling it with `compile` on a miss.
    pub fn get_or_compile<F>(
        &self,
        key: &str,
        compile: F,
    ) -> Result<Arc<dyn CompiledSchema>, SchemaError>
    where
        F: FnOnce() -> Result<Arc<dyn CompiledSchema>, SchemaError>,
    {
        if let Some(hit) = self.get(key) {
            log::debug!("schema cache hit {}", key);
            return Ok(hit);
        }

        log::debug!("schema cache miss {}, compiling", key);
        let compiled = compile()?;
        Ok(self.insert(key.to_string(), compiled))
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }
}
