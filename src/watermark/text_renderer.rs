//! Text watermark rendering.
//!
//! Renders a random alphanumeric payload onto a transparent RGBA canvas whose
//! width is fixed by the caller. The font size is fitted to that width with a
//! monotonic search: grow one pixel size at a time until the text is at least
//! as wide as the canvas, then step back once if it overshot.
//!
//! # Example
//!
//! ```ignore
//! use rand::SeedableRng;
//! use watermark_dataset::watermark::{render_watermark, FontSet, WatermarkSpec};
//!
//! let fonts = FontSet::load(Path::new("dataset"))?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let spec = WatermarkSpec::random(320, &mut rng);
//! let watermark = render_watermark(&spec, &fonts)?;
//! assert_eq!(watermark.width(), 320);
//! ```

use super::fonts::{FontSet, Typeface};
use super::text::random_text;
use super::WatermarkError;
use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use rand::Rng;

/// Font size the fitting search starts from.
pub const INITIAL_FONT_SIZE: u32 = 10;

/// Upper bound for the fitting search so it terminates even when the text
/// never reaches the target width.
pub const MAX_FONT_SIZE: u32 = 4096;

/// Lowest opacity drawn for a watermark.
pub const MIN_OPACITY: f32 = 0.2;

/// Highest opacity drawn for a watermark.
pub const MAX_OPACITY: f32 = 1.0;

/// Text color; opacity is carried in the alpha channel.
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

/// Measured size of a rendered string in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// Parameters for one watermark instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    /// The payload to render.
    pub text: String,
    /// Opacity (0.0 to 1.0).
    pub opacity: f32,
    /// Exact width of the rendered canvas.
    pub target_width: u32,
    /// Typeface from the font set.
    pub typeface: Typeface,
}

impl WatermarkSpec {
    /// Draw a random payload, opacity and typeface for a watermark of
    /// `target_width` pixels.
    pub fn random<R: Rng + ?Sized>(target_width: u32, rng: &mut R) -> Self {
        Self {
            text: random_text(rng),
            opacity: rng.gen_range(MIN_OPACITY..=MAX_OPACITY),
            target_width,
            typeface: rng.gen(),
        }
    }

    /// Alpha value the text is drawn with.
    pub fn alpha(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// A rendered watermark layer ready for compositing.
#[derive(Clone)]
pub struct RenderedWatermark {
    /// White text on a transparent background.
    pub image: RgbaImage,
    /// Font size the text was fitted to.
    pub font_size: u32,
    /// Size of the text inside the canvas.
    pub text_extent: TextExtent,
}

impl std::fmt::Debug for RenderedWatermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedWatermark")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("font_size", &self.font_size)
            .field("text_extent", &self.text_extent)
            .finish()
    }
}

impl RenderedWatermark {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Calculate the dimensions of `text` at `font_size`.
///
/// Width is the kerned advance of every glyph; height is the font's
/// ascent-to-descent span.
pub fn measure_text<F: Font>(font: &F, text: &str, font_size: u32) -> TextExtent {
    let scaled_font = font.as_scaled(PxScale::from(font_size as f32));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }

        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    TextExtent {
        width: width.max(0.0).ceil() as u32,
        height: scaled_font.height().max(0.0).ceil() as u32,
    }
}

/// Find the font size whose rendered width best fills `target_width`.
///
/// Starts at [`INITIAL_FONT_SIZE`] and grows one step at a time until the
/// measured width reaches the target (or [`MAX_FONT_SIZE`] is hit). An
/// overshoot is corrected by stepping back one size, never below 1.
pub fn fit_font_size<F: Font>(font: &F, text: &str, target_width: u32) -> (u32, TextExtent) {
    let mut font_size = INITIAL_FONT_SIZE;
    let mut extent = measure_text(font, text, font_size);

    while extent.width < target_width && font_size < MAX_FONT_SIZE {
        font_size += 1;
        extent = measure_text(font, text, font_size);
    }

    if extent.width > target_width && font_size > 1 {
        font_size -= 1;
        extent = measure_text(font, text, font_size);
    }

    (font_size, extent)
}

/// Render a watermark described by `spec` using the matching font.
///
/// The canvas is exactly `spec.target_width` wide and
/// `text_height + font_size` tall, with the text centered in it.
///
/// # Errors
///
/// Returns `WatermarkError::InvalidWidth` for a zero width and
/// `WatermarkError::EmptyText` when there is nothing to draw.
pub fn render_watermark(
    spec: &WatermarkSpec,
    fonts: &FontSet,
) -> Result<RenderedWatermark, WatermarkError> {
    if spec.target_width == 0 {
        return Err(WatermarkError::InvalidWidth(spec.target_width));
    }
    if spec.text.is_empty() {
        return Err(WatermarkError::EmptyText);
    }

    let font = fonts.font(spec.typeface);
    let (font_size, text_extent) = fit_font_size(font, &spec.text, spec.target_width);

    let canvas_width = spec.target_width;
    let canvas_height = text_extent.height + font_size;

    // Floor division: an overshooting first step leaves a negative offset.
    let origin_x = (canvas_width as i64 - text_extent.width as i64).div_euclid(2) as f32;
    let origin_y = ((canvas_height - text_extent.height) / 2) as f32;

    let mut image = RgbaImage::new(canvas_width, canvas_height);
    draw_text(
        &mut image,
        font,
        &spec.text,
        font_size,
        (origin_x, origin_y),
        spec.alpha(),
    );

    Ok(RenderedWatermark {
        image,
        font_size,
        text_extent,
    })
}

/// Draw `text` with its top-left corner at `origin`.
fn draw_text<F: Font>(
    image: &mut RgbaImage,
    font: &F,
    text: &str,
    font_size: u32,
    origin: (f32, f32),
    alpha: u8,
) {
    let scale = PxScale::from(font_size as f32);
    let scaled_font = font.as_scaled(scale);
    let canvas_width = image.width() as i32;
    let canvas_height = image.height() as i32;

    let baseline_y = origin.1 + scaled_font.ascent();
    let mut cursor_x = origin.0;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x >= 0 && y >= 0 && x < canvas_width && y < canvas_height {
                    let pixel_alpha = (coverage.clamp(0.0, 1.0) * alpha as f32).round() as u8;
                    let pixel = Rgba([TEXT_COLOR[0], TEXT_COLOR[1], TEXT_COLOR[2], pixel_alpha]);

                    // Overlapping glyph edges accumulate coverage.
                    let existing = image.get_pixel(x as u32, y as u32);
                    let blended = blend_pixels(*existing, pixel);
                    image.put_pixel(x as u32, y as u32, blended);
                }
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }
}

/// Blend two RGBA pixels using the "over" operator.
fn blend_pixels(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_alpha = top[3] as f32 / 255.0;
    let bottom_alpha = bottom[3] as f32 / 255.0;

    let out_alpha = top_alpha + bottom_alpha * (1.0 - top_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |t: u8, b: u8| -> u8 {
        let t = t as f32 / 255.0;
        let b = b as f32 / 255.0;
        let result = (t * top_alpha + b * bottom_alpha * (1.0 - top_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(top[0], bottom[0]),
        blend(top[1], bottom[1]),
        blend(top[2], bottom[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
