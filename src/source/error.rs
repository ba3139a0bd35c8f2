//! Photo source error types.

use thiserror::Error;

/// Errors returned while searching for candidate photos.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The search API answered with a non-200 status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The search response was not the expected JSON shape.
    #[error("Failed to parse search response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}
