//! Error types for feed clients.

/// Errors that abort a single feed fetch.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The request could not be sent or the body could not be read.
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("feed returned status {0}")]
    Status(u16),

    /// The response body is not a document of the expected shape.
    #[error("feed response is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body is not a well-formed RSS document.
    #[error("feed response is malformed: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// No client exists for the configured source name.
    #[error("unsupported feed source: {0}")]
    UnsupportedSource(String),
}
