// Error types module

use crate::source::SourceError;
use crate::watermark::WatermarkError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one photo URL into a decoded image.
///
/// Every variant is per-photo: the dataset loop logs it and moves on.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The search listed a photo without a usable download URL.
    #[error("Photo has no download URL")]
    MissingUrl,

    /// Only http:// and https:// URLs can be downloaded.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedUrl(String),

    /// The request could not be sent or the body could not be read.
    #[error("HTTP fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP request failed with status: {0}")]
    Status(u16),

    /// The body is not an image in a supported format.
    #[error("Failed to decode image: {0}")]
    Decode(String),
}

/// Errors that end a dataset run or fail a single photo.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Photo search failed; fatal for the run.
    #[error("Photo search failed: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Watermark synthesis failed: {0}")]
    Watermark(#[from] WatermarkError),

    /// Filesystem error on a dataset path.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or saving an image failed.
    #[error("Failed to write image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The search kept returning empty pages.
    #[error("Photo source exhausted after {empty_pages} consecutive empty pages ({processed} of {target} images processed)")]
    SourceExhausted {
        empty_pages: u32,
        processed: usize,
        target: usize,
    },

    /// Invalid run configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}
