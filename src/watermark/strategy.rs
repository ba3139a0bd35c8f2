//! Watermark placement strategies.
//!
//! Every photo is watermarked with exactly one strategy: a single large
//! watermark, or a grid of identical smaller ones. Both draw all of their
//! parameters from the caller's random number generator.

use super::compositor::{composite, composite_at};
use super::fonts::FontSet;
use super::position::{calculate_grid, calculate_single, random_rotation, GridShape, ImageDimensions};
use super::text_renderer::{render_watermark, WatermarkSpec};
use super::WatermarkError;
use image::DynamicImage;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How watermarks are laid out on a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatermarkStrategy {
    /// One watermark at a random position.
    Single,
    /// A rows x cols grid of the same watermark.
    Grid,
}

impl WatermarkStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatermarkStrategy::Single => "single",
            WatermarkStrategy::Grid => "grid",
        }
    }
}

impl fmt::Display for WatermarkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatermarkStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(WatermarkStrategy::Single),
            "grid" => Ok(WatermarkStrategy::Grid),
            other => Err(format!(
                "Unknown watermark strategy '{}': expected 'single' or 'grid'",
                other
            )),
        }
    }
}

impl Distribution<WatermarkStrategy> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> WatermarkStrategy {
        if rng.gen_bool(0.5) {
            WatermarkStrategy::Single
        } else {
            WatermarkStrategy::Grid
        }
    }
}

/// Watermark `image` with `strategy`, returning a new image.
pub fn apply_strategy<R: Rng + ?Sized>(
    strategy: WatermarkStrategy,
    image: &DynamicImage,
    fonts: &FontSet,
    rng: &mut R,
) -> Result<DynamicImage, WatermarkError> {
    match strategy {
        WatermarkStrategy::Single => watermark_single(image, fonts, rng),
        WatermarkStrategy::Grid => watermark_grid(image, fonts, rng),
    }
}

/// Place one watermark with random width, rotation and position.
pub fn watermark_single<R: Rng + ?Sized>(
    image: &DynamicImage,
    fonts: &FontSet,
    rng: &mut R,
) -> Result<DynamicImage, WatermarkError> {
    let dimensions = ImageDimensions::new(image.width(), image.height());
    let placement = calculate_single(&dimensions, rng);

    let spec = WatermarkSpec::random(placement.width, rng);
    let watermark = render_watermark(&spec, fonts)?;

    debug!(
        strategy = "single",
        text = %spec.text,
        typeface = ?spec.typeface,
        width = placement.width,
        font_size = watermark.font_size,
        rotation = placement.rotation_degrees,
        x = placement.position.x,
        y = placement.position.y,
        "Applying watermark"
    );

    Ok(composite(
        image,
        &watermark.image,
        placement.position,
        placement.rotation_degrees,
    ))
}

/// Tile one rendered watermark over a random grid.
///
/// The width is drawn from `[max_width / 2, max_width]`, where `max_width`
/// keeps the rotated watermark inside its cell. Cells too narrow for any
/// text still get a one pixel wide watermark.
pub fn watermark_grid<R: Rng + ?Sized>(
    image: &DynamicImage,
    fonts: &FontSet,
    rng: &mut R,
) -> Result<DynamicImage, WatermarkError> {
    let dimensions = ImageDimensions::new(image.width(), image.height());
    let shape = GridShape::random(rng);
    let rotation = random_rotation(rng);
    let placement = calculate_grid(&dimensions, shape, rotation, rng);

    let max_width = placement.max_watermark_width.max(1);
    let width = rng.gen_range((max_width / 2).max(1)..=max_width);

    let spec = WatermarkSpec::random(width, rng);
    let watermark = render_watermark(&spec, fonts)?;

    debug!(
        strategy = "grid",
        text = %spec.text,
        typeface = ?spec.typeface,
        rows = shape.rows(),
        cols = shape.cols(),
        width,
        max_width = placement.max_watermark_width,
        font_size = watermark.font_size,
        rotation,
        jitter_x = placement.jitter.0,
        jitter_y = placement.jitter.1,
        "Applying watermark"
    );

    Ok(composite_at(
        image,
        &watermark.image,
        &placement.positions,
        rotation,
    ))
}
