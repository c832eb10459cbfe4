use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::domain::{Application, JobId};

/// Key under which a fetched query result is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Applicants(JobId),
}

/// One cached result. The generation changes every time the entry is stored, so holders can
/// tell a new list from the one they already derived state from.
#[derive(Debug, Clone)]
pub struct CachedQuery {
    pub generation: u64,
    pub applications: Arc<Vec<Application>>,
}

/// Session-scoped query store with explicit key-based eviction.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CachedQuery>>,
    generation: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<CachedQuery> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    pub fn store(&self, key: QueryKey, applications: Vec<Application>) -> CachedQuery {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = CachedQuery {
            generation,
            applications: Arc::new(applications),
        };
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key, entry.clone());
        entry
    }

    /// Evict an entry; returns whether anything was cached under the key.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let evicted = entries.remove(key).is_some();
        debug!(?key, evicted, "query invalidated");
        evicted
    }
}
