use crate::search::DEFAULT_MAX_CANDIDATES;
use std::time::Duration;

/// Minimum size the browser asks for; larger than the search default
/// because covers are shown at full panel width.
pub const BROWSER_MIN_SIZE: u64 = 40 * 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Tuning for cover lookups
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub min_size: u64,
    pub max_candidates: usize,
    /// Per-request timeout for both searches and probes
    pub timeout: Duration,
    pub user_agent: String,
    /// How long a lookup result is reused for the same query
    pub cache_ttl: Duration,
    /// Shown when no cover is found
    pub placeholder: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_size: BROWSER_MIN_SIZE,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            placeholder: None,
        }
    }
}
