use crate::cache::CoverCache;
use crate::config::SearchSettings;
use crate::search::ImageSearch;

/// Result of a cache-aware cover lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: Option<String>,
    pub from_cache: bool,
}

impl Resolution {
    /// The found URL, else the configured placeholder
    pub fn url_or_placeholder<'a>(&'a self, settings: &'a SearchSettings) -> Option<&'a str> {
        self.url.as_deref().or(settings.placeholder.as_deref())
    }
}

/// Cover lookups memoized per query string
pub struct CoverResolver {
    search: ImageSearch,
    cache: CoverCache,
    settings: SearchSettings,
}

impl CoverResolver {
    pub fn new(search: ImageSearch, settings: SearchSettings) -> Self {
        Self {
            search,
            cache: CoverCache::new(settings.cache_ttl),
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// True when `resolve(query)` would be answered without network access
    pub fn is_cached(&self, query: &str) -> bool {
        query.is_empty() || self.cache.get(query).is_some()
    }

    pub async fn resolve(&mut self, query: &str) -> Resolution {
        if query.is_empty() {
            return Resolution {
                url: None,
                from_cache: false,
            };
        }

        if let Some(entry) = self.cache.get(query) {
            tracing::debug!("Cover cache hit: {}", query);
            return Resolution {
                url: entry.url.clone(),
                from_cache: true,
            };
        }

        self.cache.purge_expired();
        let url = self
            .search
            .select(query, self.settings.min_size, self.settings.max_candidates)
            .await;
        self.cache.insert(query, url.clone());

        Resolution {
            url,
            from_cache: false,
        }
    }
}
