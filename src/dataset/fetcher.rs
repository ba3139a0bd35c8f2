//! Photo downloader.
//!
//! Downloads a photo over HTTP(S) and decodes it in memory. The format is
//! detected from the magic bytes first and the URL extension second.
//!
//! # Example
//!
//! ```ignore
//! use watermark_dataset::dataset::fetcher::ImageFetcher;
//!
//! let fetcher = ImageFetcher::new()?;
//! let photo = fetcher.fetch("https://images.pexels.com/photos/1/large.jpeg").await?;
//! ```

use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::FetchError;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::time::Duration;

/// HTTP photo downloader.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http_client: reqwest::Client,
}

impl ImageFetcher {
    /// Create a fetcher with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    /// (e.g., TLS configuration issues).
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }

    /// Download and decode the photo at `url`.
    ///
    /// # Errors
    ///
    /// - `FetchError::UnsupportedUrl` for anything but http:// or https://
    /// - `FetchError::Http` when the request or body read fails
    /// - `FetchError::Status` for non-success responses
    /// - `FetchError::Decode` when the body is not a supported image
    pub async fn fetch(&self, url: &str) -> Result<DynamicImage, FetchError> {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }

        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;

        decode_image(&bytes, url)
    }
}

/// Decode image bytes, using `path` as a format hint when the magic bytes
/// are not recognized.
pub fn decode_image(data: &[u8], path: &str) -> Result<DynamicImage, FetchError> {
    let format = detect_image_format(data, path)?;

    image::load(Cursor::new(data), format)
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// Detect image format from bytes or filename extension.
pub fn detect_image_format(data: &[u8], path: &str) -> Result<ImageFormat, FetchError> {
    // Try to detect from magic bytes first
    if let Ok(format) = image::guess_format(data) {
        return Ok(format);
    }

    // Fall back to extension, ignoring any query string
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let ext = path
        .rsplit('.')
        .next()
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "gif" => Ok(ImageFormat::Gif),
        "webp" => Ok(ImageFormat::WebP),
        _ => Err(FetchError::Decode(format!(
            "Unsupported image format: {ext}"
        ))),
    }
}
