use super::error::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::ElementRef;

/// One image-search provider.
///
/// Implementations return every absolute HTTP(S) URL they can find for the
/// query, in page order. They neither deduplicate nor validate.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Short name used for provenance and logging
    fn name(&self) -> &'static str;

    /// Run the search and collect candidate URLs
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

/// GET a search page and return its body as text
pub(crate) async fn fetch_html(
    client: &Client,
    backend: &'static str,
    url: &str,
) -> Result<String, SearchError> {
    tracing::debug!("{} search: {}", backend, url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SearchError::Request { backend, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Status { backend, status });
    }

    response
        .text()
        .await
        .map_err(|source| SearchError::Request { backend, source })
}

/// First non-empty value among `attrs`, in the given order
pub(crate) fn first_attr<'a>(element: &ElementRef<'a>, attrs: &[&str]) -> Option<&'a str> {
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .find(|value| !value.is_empty())
}

/// True for syntactically absolute `http`/`https` URLs
pub fn is_absolute_http(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}
