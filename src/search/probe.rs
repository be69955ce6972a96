use super::error::ProbeError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;

/// Outcome of a header-only check against one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Rejected,
    /// An image whose size the server did not declare
    AcceptedUnknownSize,
    AcceptedWithSize(u64),
}

impl Validation {
    /// Ranking weight: unknown sizes count as a single byte
    pub fn rank(&self) -> u64 {
        match self {
            Validation::Rejected => 0,
            Validation::AcceptedUnknownSize => 1,
            Validation::AcceptedWithSize(size) => *size,
        }
    }
}

#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Classify `url` against `min_size` without fetching its body.
    /// Must not fail: any error is a rejection.
    async fn probe(&self, url: &str, min_size: u64) -> Validation;
}

/// Probe backed by an HTTP HEAD request
pub struct HeadProbe {
    client: Client,
}

impl HeadProbe {
    /// `client` should carry the timeout and redirect policy to use
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn head(&self, url: &str, min_size: u64) -> Result<Validation, ProbeError> {
        let response = self.client.head(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }

        // Read the header directly: the body size hint of a HEAD response is 0
        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let content_length = headers.get(CONTENT_LENGTH).and_then(|v| v.to_str().ok());

        Ok(classify(content_type, content_length, min_size))
    }
}

#[async_trait]
impl ImageProbe for HeadProbe {
    async fn probe(&self, url: &str, min_size: u64) -> Validation {
        match self.head(url, min_size).await {
            Ok(validation) => {
                tracing::debug!("Probe {:?}: {}", validation, url);
                validation
            }
            Err(e) => {
                tracing::debug!("Probe rejected {}: {}", url, e);
                Validation::Rejected
            }
        }
    }
}

/// Decide from the declared content type and length
pub fn classify(content_type: &str, content_length: Option<&str>, min_size: u64) -> Validation {
    if !content_type.trim().to_ascii_lowercase().starts_with("image") {
        return Validation::Rejected;
    }

    match content_length.and_then(|v| v.trim().parse::<u64>().ok()) {
        Some(length) if length >= min_size => Validation::AcceptedWithSize(length),
        Some(_) => Validation::Rejected,
        None => Validation::AcceptedUnknownSize,
    }
}
