//! Error types for region configuration loading.

/// Errors that can occur while loading region polygons.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// The region document could not be read.
    #[error("failed to read region data: {0}")]
    Io(#[from] std::io::Error),

    /// The region document is not valid JSON of the expected shape.
    #[error("failed to parse region data: {0}")]
    Parse(#[from] serde_json::Error),
}
