//! Synthetic text watermarks.
//!
//! Random alphanumeric text is rendered in white at a random opacity, fitted
//! to a target width, rotated and composited onto a photo either once or as a
//! jittered grid.
//!
//! # Pipeline
//!
//! 1. [`strategy`] picks the layout and draws every random parameter
//! 2. [`position`] computes widths, rotations and top-left corners
//! 3. [`text_renderer`] fits the font size and rasterizes the text
//! 4. [`compositor`] rotates the layer and blends it onto a copy of the photo
//!
//! # Example
//!
//! ```ignore
//! use watermark_dataset::watermark::{apply_strategy, FontSet, WatermarkStrategy};
//!
//! let fonts = FontSet::load(Path::new("dataset"))?;
//! let marked = apply_strategy(WatermarkStrategy::Grid, &photo, &fonts, &mut rng)?;
//! ```

pub mod compositor;
pub mod error;
pub mod fonts;
pub mod position;
pub mod strategy;
pub mod text;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{composite, composite_at, rotate_expand};
pub use error::WatermarkError;
pub use fonts::{FontSet, Typeface};
pub use position::{
    calculate_grid, calculate_single, grid_positions, max_watermark_width, GridPlacement,
    GridShape, ImageDimensions, PlacementPosition, SinglePlacement,
};
pub use strategy::{apply_strategy, watermark_grid, watermark_single, WatermarkStrategy};
pub use text::random_text;
pub use text_renderer::{measure_text, render_watermark, RenderedWatermark, WatermarkSpec};
