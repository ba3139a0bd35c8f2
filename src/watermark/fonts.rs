//! Typefaces used for watermark text.
//!
//! The dataset mixes a small, fixed set of typefaces so a detector does not
//! learn a single font's glyph shapes. Fonts are read from disk once at
//! startup; a missing or unparsable file is a hard error.

use super::WatermarkError;
use ab_glyph::FontVec;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::path::{Path, PathBuf};

/// A typeface from the fixed watermark font set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Typeface {
    Roboto,
    Lato,
}

impl Typeface {
    /// Every typeface in the set.
    pub const ALL: [Typeface; 2] = [Typeface::Roboto, Typeface::Lato];

    /// File name of the TrueType asset inside the fonts directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Typeface::Roboto => "Roboto-Regular.ttf",
            Typeface::Lato => "Lato-Regular.ttf",
        }
    }
}

impl Distribution<Typeface> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Typeface {
        match rng.gen_range(0..2) {
            0 => Typeface::Roboto,
            _ => Typeface::Lato,
        }
    }
}

/// Parsed fonts for every [`Typeface`].
pub struct FontSet {
    roboto: FontVec,
    lato: FontVec,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("typefaces", &Typeface::ALL)
            .finish()
    }
}

impl FontSet {
    /// Load every typeface from `dir`, using [`Typeface::file_name`].
    ///
    /// # Errors
    ///
    /// Returns `WatermarkError::FontLoad` naming the first file that is
    /// missing or not a valid font.
    pub fn load(dir: &Path) -> Result<Self, WatermarkError> {
        Ok(Self {
            roboto: load_font(&dir.join(Typeface::Roboto.file_name()))?,
            lato: load_font(&dir.join(Typeface::Lato.file_name()))?,
        })
    }

    /// Build a font set from raw font bytes.
    pub fn from_data(roboto: Vec<u8>, lato: Vec<u8>) -> Result<Self, WatermarkError> {
        Ok(Self {
            roboto: parse_font(PathBuf::from(Typeface::Roboto.file_name()), roboto)?,
            lato: parse_font(PathBuf::from(Typeface::Lato.file_name()), lato)?,
        })
    }

    /// The parsed font for `typeface`.
    pub fn font(&self, typeface: Typeface) -> &FontVec {
        match typeface {
            Typeface::Roboto => &self.roboto,
            Typeface::Lato => &self.lato,
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec, WatermarkError> {
    let data = std::fs::read(path).map_err(|e| WatermarkError::FontLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_font(path.to_path_buf(), data)
}

fn parse_font(path: PathBuf, data: Vec<u8>) -> Result<FontVec, WatermarkError> {
    FontVec::try_from_vec(data).map_err(|e| WatermarkError::FontLoad {
        path,
        reason: e.to_string(),
    })
}

/// Fonts for tests and benchmarks.
///
/// Both typefaces are backed by the bundled DejaVu Sans
/// (`tests/fonts/DejaVuSans.ttf`), so text rendering is exercised on every
/// host.
#[doc(hidden)]
pub mod test_support {
    use super::{FontSet, Typeface};
    use crate::watermark::WatermarkError;
    use std::path::Path;

    /// Raw bytes of the bundled test font.
    pub const TEST_FONT_DATA: &[u8] =
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/DejaVuSans.ttf"));

    /// A font set with both typefaces parsed from the bundled font.
    pub fn test_font_set() -> Result<FontSet, WatermarkError> {
        FontSet::from_data(TEST_FONT_DATA.to_vec(), TEST_FONT_DATA.to_vec())
    }

    /// Write every typeface file into `dir`, as `FontSet::load` expects.
    pub fn install_test_fonts(dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        for typeface in Typeface::ALL {
            std::fs::write(dir.join(typeface.file_name()), TEST_FONT_DATA)?;
        }
        Ok(())
    }
}
