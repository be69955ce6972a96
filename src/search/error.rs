use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single backend search request.
///
/// Never crosses the public `select` boundary: the harvester logs it and the
/// backend contributes no candidates.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{backend} request failed: {source}")]
    Request {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} answered with status {status}")]
    Status {
        backend: &'static str,
        status: StatusCode,
    },
}

/// Failure of a header-only probe. Always classified as a rejection.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("probe answered with status {0}")]
    Status(StatusCode),
}
