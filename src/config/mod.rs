// Configuration module

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_FONTS_DIR, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_DIR,
    DEFAULT_TARGET_COUNT,
};
use crate::watermark::WatermarkStrategy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Settings for one dataset generation run.
#[derive(Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Photo search API key, sent verbatim as the Authorization header
    pub api_key: String,
    pub api_base_url: String,
    /// Root of the dataset; image directories are created below it
    pub output_dir: PathBuf,
    /// Directory holding Roboto-Regular.ttf and Lato-Regular.ttf
    pub fonts_dir: PathBuf,
    /// Minimum number of image pairs to produce
    pub target_count: usize,
    /// Index of the first pair written
    pub start_index: usize,
    /// Force one strategy; `None` draws one per photo
    pub strategy: Option<WatermarkStrategy>,
    /// Seed for every random draw; `None` seeds from OS entropy
    pub seed: Option<u64>,
    pub jpeg_quality: u8,
}

impl std::fmt::Debug for DatasetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("output_dir", &self.output_dir)
            .field("fonts_dir", &self.fonts_dir)
            .field("target_count", &self.target_count)
            .field("start_index", &self.start_index)
            .field("strategy", &self.strategy)
            .field("seed", &self.seed)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

impl DatasetConfig {
    /// Config with every optional setting at its default.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            target_count: DEFAULT_TARGET_COUNT,
            start_index: 0,
            strategy: None,
            seed: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("API key cannot be empty".to_string());
        }

        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(format!(
                "API base URL '{}' must start with http:// or https://",
                self.api_base_url
            ));
        }

        if self.target_count == 0 {
            return Err("target_count must be at least 1".to_string());
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("output_dir cannot be empty".to_string());
        }

        Ok(())
    }

    /// Root random number generator for the run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
