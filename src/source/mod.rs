//! Candidate photo search.
//!
//! Photos come from the Pexels search API. Each call to
//! [`PhotoSource::next_page`] picks a random query keyword and fetches the
//! next unseen page for it, so repeated calls walk further into the results
//! of both keywords independently.

pub mod error;

pub use error::SourceError;

use crate::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, FIRST_PAGE, PHOTOS_PER_PAGE, PHOTO_SIZE_FILTER,
};
use async_trait::async_trait;
use rand::distributions::{Distribution, Standard};
use rand::rngs::StdRng;
use rand::Rng;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// A source of candidate photo URLs, one page at a time.
///
/// Entries are `None` when a listed photo has no usable download URL; the
/// caller decides how to treat such placeholders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoSource: Send {
    /// Fetch the next page of photo URLs.
    async fn next_page(&mut self) -> Result<Vec<Option<String>>, SourceError>;
}

/// Search keyword sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    People,
    Nature,
}

impl Query {
    pub const ALL: [Query; 2] = [Query::People, Query::Nature];

    pub fn as_str(&self) -> &'static str {
        match self {
            Query::People => "people",
            Query::Nature => "nature",
        }
    }
}

impl Distribution<Query> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Query {
        match rng.gen_range(0..2) {
            0 => Query::People,
            _ => Query::Nature,
        }
    }
}

/// Search response body. Only the fields the dataset needs are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub src: Option<PhotoSrc>,
}

/// Download URLs of one photo at the sizes the API offers.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSrc {
    #[serde(default)]
    pub large: Option<String>,
}

/// Pexels search client with a per-query page counter.
pub struct PexelsClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    pages: HashMap<Query, u32>,
    rng: StdRng,
}

impl std::fmt::Debug for PexelsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PexelsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("pages", &self.pages)
            .finish()
    }
}

impl PexelsClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// `rng` only drives the query keyword choice.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Client` if the HTTP client cannot be created.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        rng: StdRng,
    ) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http_client,
            pages: HashMap::new(),
            rng,
        })
    }

    /// The page number the next search for `query` will request.
    pub fn page(&self, query: Query) -> u32 {
        self.pages.get(&query).copied().unwrap_or(FIRST_PAGE)
    }

    /// Fetch the next page for a specific query.
    ///
    /// The counter for `query` advances only after a successful response.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Api` for any status other than 200, and
    /// `SourceError::Http` or `SourceError::Parse` for transport and body
    /// failures.
    pub async fn search(&mut self, query: Query) -> Result<Vec<Option<String>>, SourceError> {
        let page = self.page(query);
        let url = format!("{}/search", self.base_url);

        debug!(query = query.as_str(), page, "Searching photos");

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, &self.api_key)
            .query(&[
                ("query", query.as_str().to_string()),
                ("per_page", PHOTOS_PER_PAGE.to_string()),
                ("size", PHOTO_SIZE_FILTER.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let urls = extract_urls(parsed);

        self.pages.insert(query, page + 1);

        debug!(
            query = query.as_str(),
            page,
            photos = urls.len(),
            "Search page received"
        );

        Ok(urls)
    }
}

#[async_trait]
impl PhotoSource for PexelsClient {
    async fn next_page(&mut self) -> Result<Vec<Option<String>>, SourceError> {
        let query: Query = self.rng.gen();
        self.search(query).await
    }
}

/// Collect `src.large` of every photo, keeping a `None` placeholder for
/// photos without one.
pub fn extract_urls(response: SearchResponse) -> Vec<Option<String>> {
    response
        .photos
        .into_iter()
        .map(|photo| {
            let url = photo.src.and_then(|src| src.large);
            if url.is_none() {
                warn!(photo_id = ?photo.id, "No large image found for photo");
            }
            url
        })
        .collect()
}
