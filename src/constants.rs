// Constants module - centralized default values for configuration
//
// Defaults for the command line, the photo search API and the on-disk
// dataset layout live here so the binary, the library and the tests agree.

// =============================================================================
// Photo search defaults
// =============================================================================

/// Default base URL of the photo search API
pub const DEFAULT_API_BASE_URL: &str = "https://api.pexels.com/v1";

/// Environment variable holding the photo search API key
pub const API_KEY_ENV: &str = "PEXELS_API_KEY";

/// Photos requested per search page
pub const PHOTOS_PER_PAGE: u32 = 10;

/// Size filter sent with every search
pub const PHOTO_SIZE_FILTER: &str = "small";

/// First page number of every query
pub const FIRST_PAGE: u32 = 1;

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Consecutive empty search pages tolerated before giving up
pub const MAX_CONSECUTIVE_EMPTY_PAGES: u32 = 5;

// =============================================================================
// Dataset defaults
// =============================================================================

/// Side length of every persisted image in pixels
pub const CANONICAL_SIZE: u32 = 448;

/// Default number of image pairs to produce
pub const DEFAULT_TARGET_COUNT: usize = 10;

/// Default root directory of the dataset
pub const DEFAULT_OUTPUT_DIR: &str = "dataset";

/// Default directory holding the watermark fonts
pub const DEFAULT_FONTS_DIR: &str = "dataset";

/// Subdirectory for the original photos
pub const UNMARKED_DIR_NAME: &str = "images_unmarked";

/// Subdirectory for the watermarked photos
pub const WATERMARKED_DIR_NAME: &str = "images_watermarked";

/// File extension of persisted images
pub const IMAGE_EXTENSION: &str = "jpeg";

/// Default JPEG encoder quality (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level when RUST_LOG is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";
