use super::backend::{fetch_html, first_attr, is_absolute_http, ImageBackend};
use super::error::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";
const IMG_ATTRS: &[&str] = &["data-iurl", "data-src", "src", "data-url"];
const IMGURL_PARAM: &str = "imgurl=";

pub struct GoogleBackend {
    client: Client,
    endpoint: String,
}

impl GoogleBackend {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, GOOGLE_SEARCH_URL)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ImageBackend for GoogleBackend {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = format!(
            "{}?q={}&tbm=isch",
            self.endpoint,
            urlencoding::encode(query)
        );
        let html = fetch_html(&self.client, self.name(), &url).await?;
        Ok(parse_results(&html))
    }
}

/// Extract candidates from a Google image results page: `<img>` sources
/// first, then redirect targets embedded in `imgurl=` anchor parameters.
pub fn parse_results(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut urls = Vec::new();

    if let Ok(selector) = Selector::parse("img") {
        for img in document.select(&selector) {
            if let Some(src) = first_attr(&img, IMG_ATTRS) {
                if is_absolute_http(src) {
                    urls.push(src.to_string());
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("a[href]") {
        for link in document.select(&selector) {
            let href = link.value().attr("href").unwrap_or_default();
            if let Some(target) = imgurl_target(href) {
                urls.push(target);
            }
        }
    }

    urls
}

/// Decode the `imgurl` parameter of a result link, if it holds an absolute URL
fn imgurl_target(href: &str) -> Option<String> {
    let (_, rest) = href.split_once(IMGURL_PARAM)?;
    let raw = rest.split('&').next().unwrap_or_default();
    let decoded = urlencoding::decode(raw).ok()?;
    is_absolute_http(&decoded).then(|| decoded.into_owned())
}
