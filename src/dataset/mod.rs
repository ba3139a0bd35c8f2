//! Paired dataset generation.
//!
//! Every successfully processed photo yields two 448x448 JPEG files that
//! share one index: the original under `images_unmarked/` and a watermarked
//! copy under `images_watermarked/`. The watermark is applied at the photo's
//! native resolution and both images are resized afterwards.
//!
//! Failures of a single photo are logged and skipped; only photo search
//! errors end a run.

pub mod fetcher;

pub use fetcher::ImageFetcher;

use crate::config::DatasetConfig;
use crate::constants::{
    CANONICAL_SIZE, IMAGE_EXTENSION, MAX_CONSECUTIVE_EMPTY_PAGES, UNMARKED_DIR_NAME,
    WATERMARKED_DIR_NAME,
};
use crate::error::{DatasetError, FetchError};
use crate::source::{PexelsClient, PhotoSource};
use crate::watermark::{apply_strategy, FontSet, WatermarkError, WatermarkStrategy};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk layout of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    unmarked_dir: PathBuf,
    watermarked_dir: PathBuf,
}

impl OutputLayout {
    /// Layout rooted at `root`. Nothing is created on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            unmarked_dir: root.join(UNMARKED_DIR_NAME),
            watermarked_dir: root.join(WATERMARKED_DIR_NAME),
            root,
        }
    }

    /// Create both image directories if they are missing.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let layout = Self::new(root);
        for dir in [&layout.unmarked_dir, &layout.watermarked_dir] {
            fs::create_dir_all(dir).map_err(|source| DatasetError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn unmarked_dir(&self) -> &Path {
        &self.unmarked_dir
    }

    pub fn watermarked_dir(&self) -> &Path {
        &self.watermarked_dir
    }

    pub fn unmarked_path(&self, index: usize) -> PathBuf {
        self.unmarked_dir.join(file_name(index))
    }

    pub fn watermarked_path(&self, index: usize) -> PathBuf {
        self.watermarked_dir.join(file_name(index))
    }
}

fn file_name(index: usize) -> String {
    format!("{}.{}", index, IMAGE_EXTENSION)
}

/// One training example, both images at the canonical size.
#[derive(Debug, Clone)]
pub struct ImagePair {
    pub unmarked: DynamicImage,
    pub watermarked: DynamicImage,
}

impl ImagePair {
    /// Watermark `photo` with `strategy` and resize both versions.
    pub fn synthesize<R: Rng + ?Sized>(
        photo: &DynamicImage,
        strategy: WatermarkStrategy,
        fonts: &FontSet,
        rng: &mut R,
    ) -> Result<Self, WatermarkError> {
        let watermarked = apply_strategy(strategy, photo, fonts, rng)?;
        Ok(Self {
            unmarked: resize_canonical(photo),
            watermarked: resize_canonical(&watermarked),
        })
    }

    /// Write both images under `index`.
    ///
    /// Both images are encoded before anything touches the disk. If the
    /// watermarked file cannot be written the unmarked one is removed again,
    /// so an index never holds half a pair.
    pub fn save(&self, layout: &OutputLayout, index: usize, quality: u8) -> Result<(), DatasetError> {
        let unmarked_path = layout.unmarked_path(index);
        let watermarked_path = layout.watermarked_path(index);

        let unmarked = encode_jpeg(&self.unmarked, &unmarked_path, quality)?;
        let watermarked = encode_jpeg(&self.watermarked, &watermarked_path, quality)?;

        write_file(&unmarked_path, &unmarked)?;
        if let Err(e) = write_file(&watermarked_path, &watermarked) {
            if let Err(cleanup) = fs::remove_file(&unmarked_path) {
                warn!(
                    path = %unmarked_path.display(),
                    error = %cleanup,
                    "Failed to remove orphaned unmarked image"
                );
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Resize to exactly `CANONICAL_SIZE` x `CANONICAL_SIZE`, ignoring aspect
/// ratio.
pub fn resize_canonical(image: &DynamicImage) -> DynamicImage {
    image.resize_exact(CANONICAL_SIZE, CANONICAL_SIZE, FilterType::Lanczos3)
}

/// Encode `image` as an RGB JPEG at `path`.
pub fn save_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), DatasetError> {
    let bytes = encode_jpeg(image, path, quality)?;
    write_file(path, &bytes)
}

/// Encode `image` as an in-memory RGB JPEG; `path` only labels errors.
fn encode_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<Vec<u8>, DatasetError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&image.to_rgb8())
        .map_err(|source| DatasetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(bytes)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), DatasetError> {
    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Settings for a [`DatasetWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Index of the first pair written.
    pub start_index: usize,
    /// Force a strategy instead of drawing one per photo.
    pub strategy: Option<WatermarkStrategy>,
    pub jpeg_quality: u8,
}

/// Turns photo URLs into persisted image pairs under consecutive indices.
pub struct DatasetWriter {
    layout: OutputLayout,
    fetcher: ImageFetcher,
    fonts: FontSet,
    rng: StdRng,
    options: WriterOptions,
    processed: usize,
}

impl std::fmt::Debug for DatasetWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetWriter")
            .field("layout", &self.layout)
            .field("options", &self.options)
            .field("processed", &self.processed)
            .finish()
    }
}

impl DatasetWriter {
    pub fn new(
        layout: OutputLayout,
        fetcher: ImageFetcher,
        fonts: FontSet,
        rng: StdRng,
        options: WriterOptions,
    ) -> Self {
        Self {
            layout,
            fetcher,
            fonts,
            rng,
            options,
            processed: 0,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Pairs written by this writer.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Index the next successful pair will be written under.
    pub fn next_index(&self) -> usize {
        self.options.start_index + self.processed
    }

    /// Watermark and persist an already decoded photo.
    ///
    /// Returns the index the pair was written under. The index advances only
    /// when both files were written.
    pub fn process_image(&mut self, photo: &DynamicImage) -> Result<usize, DatasetError> {
        let strategy = match self.options.strategy {
            Some(strategy) => strategy,
            None => self.rng.gen(),
        };

        let pair = ImagePair::synthesize(photo, strategy, &self.fonts, &mut self.rng)?;

        let index = self.next_index();
        pair.save(&self.layout, index, self.options.jpeg_quality)?;
        self.processed += 1;

        debug!(index, %strategy, "Saved image pair");
        Ok(index)
    }

    /// Download, watermark and persist the photo at `url`.
    pub async fn process_url(&mut self, url: Option<&str>) -> Result<usize, DatasetError> {
        let url = url.ok_or(FetchError::MissingUrl)?;
        let photo = self.fetcher.fetch(url).await?;
        self.process_image(&photo)
    }

    /// Process every URL of a page, logging and skipping failures.
    ///
    /// Returns the number of pairs written.
    pub async fn process_urls(&mut self, urls: &[Option<String>]) -> usize {
        let mut written = 0;
        for url in urls {
            match self.process_url(url.as_deref()).await {
                Ok(index) => {
                    written += 1;
                    debug!(index, url = url.as_deref().unwrap_or_default(), "Processed image");
                }
                Err(e) => {
                    warn!(
                        url = url.as_deref().unwrap_or("<missing>"),
                        error = %e,
                        "Failed to process image"
                    );
                }
            }
        }
        written
    }
}

/// Outcome of a completed [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Pairs written during the run.
    pub processed: usize,
    /// Search pages consumed.
    pub pages: usize,
    /// URLs that were listed but could not be turned into a pair.
    pub skipped: usize,
}

/// Fetch pages from `source` until at least `target` pairs were written.
///
/// The last page is always processed in full, so the run may overshoot
/// `target`.
///
/// # Errors
///
/// Returns the first `DatasetError::Source` from the search, or
/// `DatasetError::SourceExhausted` after `MAX_CONSECUTIVE_EMPTY_PAGES` empty
/// pages in a row.
pub async fn run<S>(
    source: &mut S,
    writer: &mut DatasetWriter,
    target: usize,
) -> Result<RunSummary, DatasetError>
where
    S: PhotoSource + ?Sized,
{
    let mut summary = RunSummary {
        processed: 0,
        pages: 0,
        skipped: 0,
    };
    let mut empty_pages = 0;

    while summary.processed < target {
        let urls = source.next_page().await?;
        summary.pages += 1;

        if urls.is_empty() {
            empty_pages += 1;
            warn!(empty_pages, "Photo search returned an empty page");
            if empty_pages >= MAX_CONSECUTIVE_EMPTY_PAGES {
                return Err(DatasetError::SourceExhausted {
                    empty_pages,
                    processed: summary.processed,
                    target,
                });
            }
            continue;
        }
        empty_pages = 0;

        let written = writer.process_urls(&urls).await;
        summary.processed += written;
        summary.skipped += urls.len() - written;

        info!(
            page = summary.pages,
            written,
            processed = summary.processed,
            target,
            "Processed {} images successfully",
            summary.processed
        );
    }

    Ok(summary)
}

/// Generate a dataset as described by `config`.
///
/// Fonts and output directories are prepared before the first search, so a
/// missing font or an unwritable output directory fails the run up front.
pub async fn generate(config: &DatasetConfig) -> Result<RunSummary, DatasetError> {
    config.validate().map_err(DatasetError::Config)?;

    let fonts = FontSet::load(&config.fonts_dir)?;
    let layout = OutputLayout::create(&config.output_dir)?;

    let mut rng = config.rng();
    let source_rng = StdRng::seed_from_u64(rng.gen());
    let mut source = PexelsClient::new(&config.api_base_url, &config.api_key, source_rng)?;

    let mut writer = DatasetWriter::new(
        layout,
        ImageFetcher::new()?,
        fonts,
        rng,
        WriterOptions {
            start_index: config.start_index,
            strategy: config.strategy,
            jpeg_quality: config.jpeg_quality,
        },
    );

    info!(
        output_dir = %config.output_dir.display(),
        target = config.target_count,
        start_index = config.start_index,
        strategy = config.strategy.map(|s| s.as_str()).unwrap_or("random"),
        seed = ?config.seed,
        "Generating watermark dataset"
    );

    let summary = run(&mut source, &mut writer, config.target_count).await?;

    info!(
        processed = summary.processed,
        pages = summary.pages,
        skipped = summary.skipped,
        next_index = writer.next_index(),
        "Dataset generation complete"
    );

    Ok(summary)
}
