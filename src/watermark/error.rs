//! Watermark error types.
//!
//! Defines errors that can occur while synthesizing a watermark.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during watermark synthesis.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// A required font asset is missing or could not be parsed.
    #[error("Failed to load font {}: {reason}", .path.display())]
    FontLoad { path: PathBuf, reason: String },

    /// Watermark text must contain at least one character.
    #[error("Cannot render empty watermark text")]
    EmptyText,

    /// The requested watermark width cannot be rendered.
    #[error("Invalid watermark width: {0}")]
    InvalidWidth(u32),

    /// A grid shape with zero rows or columns.
    #[error("Invalid watermark grid {rows}x{cols}: rows and cols must be at least 1")]
    InvalidGrid { rows: u32, cols: u32 },
}
