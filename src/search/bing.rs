use super::backend::{fetch_html, first_attr, is_absolute_http, ImageBackend};
use super::error::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

const BING_IMAGES_URL: &str = "https://www.bing.com/images/search";
const IMG_ATTRS: &[&str] = &["src", "data-src", "data-iurl"];

/// Metadata blob carried in the `m` attribute of `a.iusc` result links
#[derive(Debug, Deserialize)]
struct ResultMeta {
    murl: Option<String>,
}

pub struct BingBackend {
    client: Client,
    endpoint: String,
}

impl BingBackend {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, BING_IMAGES_URL)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ImageBackend for BingBackend {
    fn name(&self) -> &'static str {
        "bing"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
        let html = fetch_html(&self.client, self.name(), &url).await?;
        Ok(parse_results(&html))
    }
}

/// Extract candidates from a Bing image results page.
///
/// Full-resolution `murl` entries come first, then plain `<img>` sources.
pub fn parse_results(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut urls = Vec::new();

    if let Ok(selector) = Selector::parse("a.iusc") {
        for link in document.select(&selector) {
            let Some(meta) = link.value().attr("m") else {
                continue;
            };
            match serde_json::from_str::<ResultMeta>(meta) {
                Ok(ResultMeta { murl: Some(murl) }) if is_absolute_http(&murl) => urls.push(murl),
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping malformed bing metadata: {}", e),
            }
        }
    }

    if let Ok(selector) = Selector::parse("img") {
        for img in document.select(&selector) {
            if let Some(src) = first_attr(&img, IMG_ATTRS) {
                if is_absolute_http(src) {
                    urls.push(src.to_string());
                }
            }
        }
    }

    urls
}
