//! Album-art image search.
//!
//! Candidates are harvested from the backends in priority order, deduplicated,
//! then probed one by one. The first image at least `min_size` bytes large
//! wins; otherwise the first image of unknown size, otherwise the first
//! candidate as-is. Every failure below this API degrades to fewer candidates
//! or a rejection, so `select` never fails.

pub mod backend;
pub mod bing;
pub mod error;
pub mod google;
pub mod probe;
pub mod query;

use crate::config::SearchSettings;
use backend::{is_absolute_http, ImageBackend};
use bing::BingBackend;
use error::SearchError;
use google::GoogleBackend;
use probe::{HeadProbe, ImageProbe, Validation};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::collections::HashSet;

pub const DEFAULT_MIN_SIZE: u64 = 30 * 1024;
pub const DEFAULT_MAX_CANDIDATES: usize = 40;

const MAX_REDIRECTS: usize = 10;

/// A URL together with the backend that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub backend: &'static str,
}

pub struct ImageSearch {
    backends: Vec<Box<dyn ImageBackend>>,
    probe: Box<dyn ImageProbe>,
}

impl ImageSearch {
    /// Bing then Google, probed with HEAD requests
    pub fn new(settings: &SearchSettings) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(SearchError::Client)?;

        Ok(Self::with_parts(
            vec![
                Box::new(BingBackend::new(client.clone())),
                Box::new(GoogleBackend::new(client.clone())),
            ],
            Box::new(HeadProbe::new(client)),
        ))
    }

    /// Backends are queried in the order given
    pub fn with_parts(backends: Vec<Box<dyn ImageBackend>>, probe: Box<dyn ImageProbe>) -> Self {
        Self { backends, probe }
    }

    /// Collect up to `max_candidates` unique URLs, backend by backend.
    ///
    /// A backend is only queried while the budget is not yet exhausted, and a
    /// failing backend contributes nothing.
    pub async fn harvest(&self, query: &str, max_candidates: usize) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for backend in &self.backends {
            if candidates.len() >= max_candidates {
                break;
            }

            let urls = match backend.search(query).await {
                Ok(urls) => urls,
                Err(e) => {
                    tracing::warn!("Image backend {} failed: {}", backend.name(), e);
                    continue;
                }
            };
            tracing::debug!("{} returned {} urls", backend.name(), urls.len());

            for url in urls {
                if candidates.len() >= max_candidates {
                    break;
                }
                if url.is_empty() || !seen.insert(url.clone()) {
                    continue;
                }
                candidates.push(Candidate {
                    url,
                    backend: backend.name(),
                });
            }
        }

        candidates
    }

    /// Pick the best image URL for `query`, or `None`
    pub async fn select(&self, query: &str, min_size: u64, max_candidates: usize) -> Option<String> {
        if query.is_empty() {
            return None;
        }

        let candidates = self.harvest(query, max_candidates).await;
        tracing::debug!("{} candidates for '{}'", candidates.len(), query);

        let mut best_unknown: Option<&Candidate> = None;
        let mut best_rank = 0;

        for candidate in &candidates {
            let validation = self.probe.probe(&candidate.url, min_size).await;
            // An unknown size ranks as one byte, so it wins outright when
            // `min_size` is 0 or 1. A declared length of 0 never wins.
            let rank = validation.rank();
            if rank > 0 && rank >= min_size {
                tracing::info!(
                    "Cover for '{}' from {}: {} ({:?})",
                    query,
                    candidate.backend,
                    candidate.url,
                    validation
                );
                return Some(candidate.url.clone());
            }
            if validation == Validation::AcceptedUnknownSize && rank > best_rank {
                best_unknown = Some(candidate);
                best_rank = rank;
            }
        }

        if let Some(candidate) = best_unknown {
            tracing::info!(
                "Cover for '{}' of unknown size from {}: {}",
                query,
                candidate.backend,
                candidate.url
            );
            return Some(candidate.url.clone());
        }

        let fallback = candidates
            .into_iter()
            .find(|c| is_absolute_http(&c.url))
            .map(|c| c.url);
        match &fallback {
            Some(url) => tracing::info!("Unvalidated cover for '{}': {}", query, url),
            None => tracing::info!("No cover candidates for '{}'", query),
        }
        fallback
    }

    /// `select` with the default size threshold and candidate budget
    pub async fn select_default(&self, query: &str) -> Option<String> {
        self.select(query, DEFAULT_MIN_SIZE, DEFAULT_MAX_CANDIDATES)
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) struct MockBackend {
        pub name: &'static str,
        pub urls: Option<Vec<&'static str>>,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockBackend {
        pub(crate) fn new(name: &'static str, urls: &[&'static str]) -> Self {
            Self {
                name,
                urls: Some(urls.to_vec()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn failing(name: &'static str) -> Self {
            Self {
                name,
                urls: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ImageBackend for MockBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, _query: &str) -> Result<Vec<String>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.urls {
                Some(urls) => Ok(urls.iter().map(|u| u.to_string()).collect()),
                None => Err(SearchError::Status {
                    backend: self.name,
                    status: StatusCode::SERVICE_UNAVAILABLE,
                }),
            }
        }
    }

    /// Answers from a fixed table; unlisted URLs are rejected
    pub(crate) struct MockProbe {
        pub outcomes: HashMap<&'static str, Validation>,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockProbe {
        pub(crate) fn new(outcomes: &[(&'static str, Validation)]) -> Self {
            Self {
                outcomes: outcomes.iter().copied().collect(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ImageProbe for MockProbe {
        async fn probe(&self, url: &str, _min_size: u64) -> Validation {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .get(url)
                .copied()
                .unwrap_or(Validation::Rejected)
        }
    }

    fn urls(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_query_does_no_work() {
        let backend = MockBackend::new("a", &["https://a.example/1.jpg"]);
        let backend_calls = backend.calls.clone();
        let probe = MockProbe::new(&[]);
        let probe_calls = probe.calls.clone();
        let search = ImageSearch::with_parts(vec![Box::new(backend)], Box::new(probe));

        assert_eq!(search.select("", 0, 0).await, None);
        assert_eq!(search.select("", 30720, 40).await, None);
        assert_eq!(backend_calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_everything_failing_still_returns() {
        let search = ImageSearch::with_parts(
            vec![
                Box::new(MockBackend::failing("a")),
                Box::new(MockBackend::failing("b")),
            ],
            Box::new(MockProbe::new(&[])),
        );
        assert_eq!(search.select("anything album cover", 30720, 40).await, None);

        let search = ImageSearch::with_parts(
            vec![
                Box::new(MockBackend::failing("a")),
                Box::new(MockBackend::new("b", &["https://b.example/1.jpg"])),
            ],
            Box::new(MockProbe::new(&[])),
        );
        assert_eq!(
            search.select("anything album cover", 30720, 40).await,
            Some("https://b.example/1.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_harvest_keeps_backend_priority_and_dedups() {
        let search = ImageSearch::with_parts(
            vec![
                Box::new(MockBackend::new("a", &["u1", "u2"])),
                Box::new(MockBackend::new("b", &["u2", "u3"])),
            ],
            Box::new(MockProbe::new(&[])),
        );

        let candidates = search.harvest("q", 40).await;
        assert_eq!(urls(&candidates), vec!["u1", "u2", "u3"]);
        assert_eq!(candidates[1].backend, "a");
        assert_eq!(candidates[2].backend, "b");
    }

    #[tokio::test]
    async fn test_first_large_image_wins_without_more_probes() {
        let probe = MockProbe::new(&[
            ("https://a.example/1.jpg", Validation::AcceptedWithSize(50000)),
            ("https://a.example/2.jpg", Validation::AcceptedWithSize(90000)),
        ]);
        let probe_calls = probe.calls.clone();
        let search = ImageSearch::with_parts(
            vec![Box::new(MockBackend::new(
                "a",
                &["https://a.example/1.jpg", "https://a.example/2.jpg"],
            ))],
            Box::new(probe),
        );

        assert_eq!(
            search.select("q", 30000, 40).await,
            Some("https://a.example/1.jpg".to_string())
        );
        assert_eq!(probe_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_size_image_is_the_fallback() {
        let probe = MockProbe::new(&[
            ("https://a.example/2.jpg", Validation::AcceptedUnknownSize),
            ("https://a.example/3.jpg", Validation::AcceptedUnknownSize),
        ]);
        let probe_calls = probe.calls.clone();
        let search = ImageSearch::with_parts(
            vec![Box::new(MockBackend::new(
                "a",
                &[
                    "https://a.example/1.jpg",
                    "https://a.example/2.jpg",
                    "https://a.example/3.jpg",
                ],
            ))],
            Box::new(probe),
        );

        assert_eq!(
            search.select("q", 30000, 40).await,
            Some("https://a.example/2.jpg".to_string())
        );
        // No early exit without a sized match
        assert_eq!(probe_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_undersized_images_are_not_remembered() {
        // A sized accept below the threshold never wins, even over nothing
        let search = ImageSearch::with_parts(
            vec![Box::new(MockBackend::new(
                "a",
                &["https://a.example/1.jpg", "https://a.example/2.jpg"],
            ))],
            Box::new(MockProbe::new(&[(
                "https://a.example/2.jpg",
                Validation::AcceptedWithSize(100),
            )])),
        );

        assert_eq!(
            search.select("q", 30000, 40).await,
            Some("https://a.example/1.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_size_wins_outright_under_tiny_threshold() {
        let probe = MockProbe::new(&[
            ("https://a.example/1.jpg", Validation::AcceptedUnknownSize),
            ("https://a.example/2.jpg", Validation::AcceptedWithSize(50000)),
        ]);
        let probe_calls = probe.calls.clone();
        let search = ImageSearch::with_parts(
            vec![Box::new(MockBackend::new(
                "a",
                &["https://a.example/1.jpg", "https://a.example/2.jpg"],
            ))],
            Box::new(probe),
        );

        assert_eq!(
            search.select("q", 1, 40).await,
            Some("https://a.example/1.jpg".to_string())
        );
        assert_eq!(probe_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_length_image_never_wins() {
        let probe = MockProbe::new(&[
            ("https://a.example/1.jpg", Validation::AcceptedWithSize(0)),
            ("https://a.example/2.jpg", Validation::AcceptedWithSize(10)),
        ]);
        let probe_calls = probe.calls.clone();
        let search = ImageSearch::with_parts(
            vec![Box::new(MockBackend::new(
                "a",
                &["https://a.example/1.jpg", "https://a.example/2.jpg"],
            ))],
            Box::new(probe),
        );

        assert_eq!(
            search.select("q", 0, 40).await,
            Some("https://a.example/2.jpg".to_string())
        );
        assert_eq!(probe_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_rejected_falls_back_to_first_absolute_url() {
        let search = ImageSearch::with_parts(
            vec![Box::new(MockBackend::new(
                "a",
                &["not a url", "/relative.jpg", "https://a.example/3.jpg", "https://a.example/4.jpg"],
            ))],
            Box::new(MockProbe::new(&[])),
        );

        assert_eq!(
            search.select("q", 30000, 40).await,
            Some("https://a.example/3.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_max_candidates_caps_harvest() {
        let first = MockBackend::new("a", &["https://a.example/1.jpg", "https://a.example/2.jpg"]);
        let second = MockBackend::new("b", &["https://b.example/1.jpg"]);
        let second_calls = second.calls.clone();
        let probe = MockProbe::new(&[]);
        let probe_calls = probe.calls.clone();
        let search = ImageSearch::with_parts(vec![Box::new(first), Box::new(second)], Box::new(probe));

        assert_eq!(search.harvest("q", 1).await.len(), 1);
        assert_eq!(
            search.select("q", 30000, 1).await,
            Some("https://a.example/1.jpg".to_string())
        );
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_budget_selects_nothing() {
        let search = ImageSearch::with_parts(
            vec![Box::new(MockBackend::new("a", &["https://a.example/1.jpg"]))],
            Box::new(MockProbe::new(&[])),
        );
        assert_eq!(search.select("q", 30000, 0).await, None);
    }

    #[tokio::test]
    async fn test_repeated_selects_agree() {
        let search = ImageSearch::with_parts(
            vec![
                Box::new(MockBackend::new("a", &["https://a.example/1.jpg"])),
                Box::new(MockBackend::new("b", &["https://b.example/1.jpg", "https://b.example/2.jpg"])),
            ],
            Box::new(MockProbe::new(&[
                ("https://b.example/1.jpg", Validation::AcceptedUnknownSize),
                ("https://b.example/2.jpg", Validation::AcceptedWithSize(40000)),
            ])),
        );

        let first = search.select("q", 30000, 40).await;
        assert_eq!(first, Some("https://b.example/2.jpg".to_string()));
        for _ in 0..3 {
            assert_eq!(search.select("q", 30000, 40).await, first);
        }
    }
}
