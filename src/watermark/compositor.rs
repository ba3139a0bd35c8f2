//! Watermark compositor for blending watermarks onto images.
//!
//! A watermark layer is first rotated counter-clockwise about its center on
//! an expanded canvas, so the rotated text is never cropped. Placement
//! positions refer to the top-left corner of that expanded canvas. The layer
//! is then blended onto a copy of the base image using its own alpha channel
//! as the mask; the inputs are never modified.
//!
//! # Example
//!
//! ```ignore
//! use watermark_dataset::watermark::compositor::composite;
//! use watermark_dataset::watermark::PlacementPosition;
//!
//! let marked = composite(&photo, &watermark.image, PlacementPosition::new(120, 80), 30);
//! ```

use super::position::PlacementPosition;
use image::{DynamicImage, Rgba, RgbaImage};

/// Composite one watermark onto a copy of `base`.
pub fn composite(
    base: &DynamicImage,
    watermark: &RgbaImage,
    position: PlacementPosition,
    rotation_degrees: u32,
) -> DynamicImage {
    composite_at(base, watermark, &[position], rotation_degrees)
}

/// Composite the same watermark at every position onto a copy of `base`.
///
/// The layer is rotated once and reused for all positions, which yields the
/// same pixels as compositing each position separately.
pub fn composite_at(
    base: &DynamicImage,
    watermark: &RgbaImage,
    positions: &[PlacementPosition],
    rotation_degrees: u32,
) -> DynamicImage {
    let layer = rotate_expand(watermark, rotation_degrees as f32);

    let mut target = base.to_rgba8();
    for position in positions {
        blend_layer(&mut target, &layer, *position);
    }

    DynamicImage::ImageRgba8(target)
}

/// Rotate an image counter-clockwise by `degrees`, expanding the canvas to
/// the rotated bounding box.
///
/// Pixels outside the source are transparent. Sampling is bilinear on
/// premultiplied color so transparent neighbors do not darken text edges.
/// Multiples of 360° return an exact copy.
pub fn rotate_expand(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let normalized = degrees.rem_euclid(360.0);
    if normalized == 0.0 {
        return image.clone();
    }

    let (sin, cos) = normalized.to_radians().sin_cos();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;

    // Shave float noise so 90° does not grow the canvas by a pixel.
    let dst_w = ((src_w * cos.abs() + src_h * sin.abs()) - 1e-3).ceil().max(1.0) as u32;
    let dst_h = ((src_w * sin.abs() + src_h * cos.abs()) - 1e-3).ceil().max(1.0) as u32;

    let cx = src_w / 2.0;
    let cy = src_h / 2.0;
    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    let mut rotated = RgbaImage::new(dst_w, dst_h);

    for (dx, dy, pixel) in rotated.enumerate_pixels_mut() {
        // Destination pixel center relative to the canvas center.
        let rx = dx as f32 + 0.5 - dst_cx;
        let ry = dy as f32 + 0.5 - dst_cy;

        // Inverse of the counter-clockwise rotation (y axis points down).
        let sx = rx * cos - ry * sin + cx - 0.5;
        let sy = rx * sin + ry * cos + cy - 0.5;

        *pixel = sample_bilinear(image, sx, sy);
    }

    rotated
}

/// Bilinear sample at continuous pixel coordinates; out-of-bounds neighbors
/// count as transparent.
fn sample_bilinear(image: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let width = image.width() as i64;
    let height = image.height() as i64;

    if x <= -1.0 || y <= -1.0 || x >= width as f32 || y >= height as f32 {
        return Rgba([0, 0, 0, 0]);
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let taps = [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ];

    let mut color = [0.0f32; 3];
    let mut coverage = 0.0f32;

    for (ox, oy, weight) in taps {
        if weight <= 0.0 {
            continue;
        }
        let px = x0 as i64 + ox;
        let py = y0 as i64 + oy;
        if px < 0 || py < 0 || px >= width || py >= height {
            continue;
        }

        let p = image.get_pixel(px as u32, py as u32);
        let a = p[3] as f32 / 255.0 * weight;
        color[0] += p[0] as f32 * a;
        color[1] += p[1] as f32 * a;
        color[2] += p[2] as f32 * a;
        coverage += a;
    }

    if coverage <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |c: f32| -> u8 { (c / coverage).round().clamp(0.0, 255.0) as u8 };

    Rgba([
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        (coverage * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Blend `layer` onto `target` with its top-left corner at `position`,
/// clipping to the target bounds.
fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage, position: PlacementPosition) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let layer_width = layer.width() as i64;
    let layer_height = layer.height() as i64;

    let pos_x = position.x as i64;
    let pos_y = position.y as i64;

    // Visible region in target coordinates
    let x_start = pos_x.max(0);
    let y_start = pos_y.max(0);
    let x_end = (pos_x + layer_width).min(target_width);
    let y_end = (pos_y + layer_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - pos_x) as u32;
            let wy = (ty - pos_y) as u32;

            let wm_pixel = layer.get_pixel(wx, wy);
            if wm_pixel[3] == 0 {
                continue;
            }

            let target_pixel = target.get_pixel(tx as u32, ty as u32);
            let blended = blend_pixels(*target_pixel, *wm_pixel);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Blend a watermark pixel over a background pixel using the watermark's
/// alpha as the mask.
///
/// Color channels are mixed as `fg·a + bg·(1 - a)`; the output alpha follows
/// the "over" operator. A fully opaque foreground replaces the background
/// exactly.
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let mask = foreground[3] as u32;
    let inverse = 255 - mask;

    let mix = |fg: u8, bg: u8| -> u8 { ((fg as u32 * mask + bg as u32 * inverse + 127) / 255) as u8 };

    let out_alpha = mask + (background[3] as u32 * inverse + 127) / 255;

    Rgba([
        mix(foreground[0], background[0]),
        mix(foreground[1], background[1]),
        mix(foreground[2], background[2]),
        out_alpha.min(255) as u8,
    ])
}
