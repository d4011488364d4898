use thiserror::Error;

/// Failure of a single remote call
///
/// Callers decide what a failure means for their item or user; nothing here
/// is fatal to a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response from {url} is missing '{field}'")]
    MissingField { url: String, field: &'static str },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl SourceError {
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        SourceError::Status {
            url: url.into(),
            status,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::Status { status: 404, .. })
    }
}
