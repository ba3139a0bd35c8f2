use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use watermark_dataset::config::DatasetConfig;
use watermark_dataset::constants::{
    API_KEY_ENV, DEFAULT_API_BASE_URL, DEFAULT_FONTS_DIR, DEFAULT_JPEG_QUALITY,
    DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_DIR, DEFAULT_TARGET_COUNT,
};
use watermark_dataset::dataset;
use watermark_dataset::logging::{init_subscriber, LogFormat};
use watermark_dataset::watermark::WatermarkStrategy;

/// Watermark dataset generator - paired watermarked/unmarked stock photos
#[derive(Parser, Debug)]
#[command(name = "watermark-dataset")]
#[command(version, about, long_about = None)]
struct Args {
    /// Pexels API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: String,

    /// Base URL of the photo search API
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Dataset root directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Directory containing Roboto-Regular.ttf and Lato-Regular.ttf
    #[arg(long, default_value = DEFAULT_FONTS_DIR)]
    fonts_dir: PathBuf,

    /// Minimum number of image pairs to produce
    #[arg(short = 'n', long, default_value_t = DEFAULT_TARGET_COUNT)]
    target_count: usize,

    /// Index of the first image pair, to extend an existing dataset
    #[arg(long, default_value_t = 0)]
    start_index: usize,

    /// Always use this watermark strategy (single or grid)
    #[arg(long)]
    strategy: Option<WatermarkStrategy>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// JPEG quality of the saved images (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Log level or filter directive; RUST_LOG takes precedence
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Log output format (text or json)
    #[arg(long, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Args {
    fn into_config(self) -> DatasetConfig {
        DatasetConfig {
            api_key: self.api_key,
            api_base_url: self.api_base_url,
            output_dir: self.output_dir,
            fonts_dir: self.fonts_dir,
            target_count: self.target_count,
            start_index: self.start_index,
            strategy: self.strategy,
            seed: self.seed,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads the environment
    let dotenv_path = dotenvy::dotenv().ok();

    let args = Args::parse();

    init_subscriber(&args.log_level, args.log_format)
        .map_err(|e| anyhow!("Failed to initialize logging subsystem: {}", e))?;

    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    let config = args.into_config();
    let summary = dataset::generate(&config)
        .await
        .context("Dataset generation failed")?;

    tracing::info!(
        processed = summary.processed,
        pages = summary.pages,
        output_dir = %config.output_dir.display(),
        "Processed {} images successfully",
        summary.processed
    );

    Ok(())
}
