//! Position calculation for watermark placement.
//!
//! # Placement Modes
//!
//! - **Single**: one watermark somewhere in the upper-left part of the image
//!   (top-left corner between 10% and 50% of each dimension).
//! - **Grid**: a rows x cols repetition of one watermark, each instance
//!   centered in its cell and the whole grid shifted by one shared jitter.
//!
//! # Rotation
//!
//! A rectangle of width `w` rotated by `θ` has a horizontal extent of
//! `w·cos θ + h·sin θ`. Assuming `h ≤ w`, the widest watermark whose rotated
//! footprint still fits a cell of width `c` is `c / (cos θ + sin θ)`.
//!
//! # Example
//!
//! ```ignore
//! use watermark_dataset::watermark::position::{grid_positions, max_watermark_width, GridShape, ImageDimensions};
//!
//! let image = ImageDimensions { width: 1000, height: 800 };
//! let shape = GridShape::new(2, 2)?;
//! let max_width = max_watermark_width(500.0, 0.0);
//! assert_eq!(max_width, 500);
//! let positions = grid_positions(&image, shape, max_width, (0, 0));
//! assert_eq!(positions.len(), 4);
//! ```

use super::WatermarkError;
use rand::Rng;

/// Largest rotation drawn for a watermark, in degrees.
pub const MAX_ROTATION_DEGREES: u32 = 60;

/// Largest number of grid rows or columns drawn for a grid watermark.
pub const MAX_GRID_CELLS: u32 = 8;

/// Narrowest single watermark, in pixels.
pub const MIN_SINGLE_WIDTH: u32 = 300;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the shorter side.
    pub fn shorter_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// Top-left corner where a watermark should be placed.
///
/// Coordinates may be negative: a jittered grid can push watermarks past the
/// image edge, where the compositor clips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Number of rows and columns in a watermark grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    rows: u32,
    cols: u32,
}

impl GridShape {
    /// # Errors
    ///
    /// Returns `WatermarkError::InvalidGrid` if either dimension is zero.
    pub fn new(rows: u32, cols: u32) -> Result<Self, WatermarkError> {
        if rows == 0 || cols == 0 {
            return Err(WatermarkError::InvalidGrid { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Draw rows and cols uniformly from `[1, MAX_GRID_CELLS]`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            rows: rng.gen_range(1..=MAX_GRID_CELLS),
            cols: rng.gen_range(1..=MAX_GRID_CELLS),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// The computed layout of a grid watermark.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlacement {
    pub shape: GridShape,
    pub rotation_degrees: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Widest watermark that fits a cell after rotation.
    pub max_watermark_width: u32,
    /// Shift applied to every position.
    pub jitter: (i32, i32),
    /// Top-left corners in row-major order, one per cell.
    pub positions: Vec<PlacementPosition>,
}

/// Placement of a single watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinglePlacement {
    pub width: u32,
    pub rotation_degrees: u32,
    pub position: PlacementPosition,
}

/// Draw a rotation uniformly from `[0, MAX_ROTATION_DEGREES]`.
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(0..=MAX_ROTATION_DEGREES)
}

/// Widest watermark whose rotated bounding box fits a cell of `cell_width`.
///
/// Computes `cell_width / (cos θ + sin θ)` and floors it.
pub fn max_watermark_width(cell_width: f64, rotation_degrees: f64) -> u32 {
    let radians = rotation_degrees.to_radians();
    let max_width = cell_width / (radians.cos() + radians.sin());
    max_width.max(0.0).floor() as u32
}

/// Cell-centered top-left corners for a watermark of `max_width`, shifted by
/// `jitter`, in row-major order.
///
/// The vertical centering term uses `max_width` rather than the rendered
/// watermark height, so tall cells place watermarks slightly high and short
/// cells slightly low.
pub fn grid_positions(
    image: &ImageDimensions,
    shape: GridShape,
    max_width: u32,
    jitter: (i32, i32),
) -> Vec<PlacementPosition> {
    let cell_width = image.width as f64 / shape.cols as f64;
    let cell_height = image.height as f64 / shape.rows as f64;
    let max_width = max_width as f64;

    let mut positions = Vec::with_capacity(shape.cell_count());
    for row in 0..shape.rows {
        for col in 0..shape.cols {
            let x = (col as f64 * cell_width + (cell_width - max_width) / 2.0).trunc() as i32;
            let y = (row as f64 * cell_height + (cell_height - max_width) / 2.0).trunc() as i32;
            positions.push(PlacementPosition::new(x, y).offset(jitter.0, jitter.1));
        }
    }

    positions
}

/// Draw the shared grid jitter: `dx` within half a cell width, `dy` within
/// half a cell height, both inclusive.
pub fn random_jitter<R: Rng + ?Sized>(cell_width: f64, cell_height: f64, rng: &mut R) -> (i32, i32) {
    let half_width = (cell_width / 2.0) as i32;
    let half_height = (cell_height / 2.0) as i32;
    (
        rng.gen_range(-half_width..=half_width),
        rng.gen_range(-half_height..=half_height),
    )
}

/// Compute the layout for a grid watermark.
pub fn calculate_grid<R: Rng + ?Sized>(
    image: &ImageDimensions,
    shape: GridShape,
    rotation_degrees: u32,
    rng: &mut R,
) -> GridPlacement {
    let cell_width = image.width as f64 / shape.cols as f64;
    let cell_height = image.height as f64 / shape.rows as f64;

    let max_width = max_watermark_width(cell_width, rotation_degrees as f64);
    let jitter = random_jitter(cell_width, cell_height, rng);
    let positions = grid_positions(image, shape, max_width, jitter);

    GridPlacement {
        shape,
        rotation_degrees,
        cell_width,
        cell_height,
        max_watermark_width: max_width,
        jitter,
        positions,
    }
}

/// Width range for a single watermark: `[MIN_SINGLE_WIDTH, shorter side]`.
///
/// Images whose shorter side is below `MIN_SINGLE_WIDTH` collapse the range
/// to the shorter side, so the watermark spans the whole short dimension.
pub fn single_width_range(image: &ImageDimensions) -> (u32, u32) {
    let max_width = image.shorter_side().max(1);
    (MIN_SINGLE_WIDTH.min(max_width), max_width)
}

/// Draw width, rotation and position for a single watermark.
pub fn calculate_single<R: Rng + ?Sized>(image: &ImageDimensions, rng: &mut R) -> SinglePlacement {
    let (min_width, max_width) = single_width_range(image);
    let width = rng.gen_range(min_width..=max_width);
    let rotation_degrees = random_rotation(rng);

    let x = rng.gen_range(image.width / 10..=image.width / 2);
    let y = rng.gen_range(image.height / 10..=image.height / 2);

    SinglePlacement {
        width,
        rotation_degrees,
        position: PlacementPosition::new(x as i32, y as i32),
    }
}
