use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A memoized lookup result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// `None` records that the lookup found nothing
    pub url: Option<String>,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

/// In-memory cover lookup results keyed by the exact query string.
///
/// Entries expire `ttl` after insertion. Nothing is persisted.
pub struct CoverCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl CoverCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Fresh entry for `query`, if any
    pub fn get(&self, query: &str) -> Option<&CacheEntry> {
        self.entries
            .get(query)
            .filter(|entry| entry.is_fresh(self.ttl))
    }

    /// Record a lookup result, replacing any previous one
    pub fn insert(&mut self, query: &str, url: Option<String>) {
        self.entries.insert(
            query.to_string(),
            CacheEntry {
                url,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop expired entries
    pub fn purge_expired(&mut self) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(ttl));

        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!("Purged {} expired cover cache entries", removed);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
