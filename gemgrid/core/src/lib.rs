//! Turns an image into a paint-by-symbol pattern: a small grid whose cells
//! each carry one color of a bounded, symbol-labelled palette.

pub mod color;
pub mod frequency;
pub mod palette;
pub mod pattern;
pub mod sample;
pub mod session;
pub mod wasm;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use color::Rgb;
pub use frequency::{frequency_index, FrequencyRecord};
pub use palette::{select_palette, symbol_for_rank, PaletteEntry, SYMBOL_ALPHABET};
pub use pattern::{materialize, Pattern};
pub use sample::{ColorSampleGrid, Position, Resample, RgbaFrame, SampleSource};
pub use session::PatternSession;

#[derive(Debug, Error)]
pub enum QuantizeError {
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("invalid grid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("no colors to build a palette from")]
    EmptyPalette,
}

impl From<image::ImageError> for QuantizeError {
    fn from(err: image::ImageError) -> Self {
        Self::InvalidImage(format!("failed to decode image: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizeConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub max_colors: usize,
    pub filter: Resample,
}

impl QuantizeConfig {
    pub fn square(grid_size: u32, max_colors: usize) -> Self {
        Self {
            grid_width: grid_size,
            grid_height: grid_size,
            max_colors,
            ..Self::default()
        }
    }
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            grid_width: 30,
            grid_height: 30,
            max_colors: 10,
            filter: Resample::Bilinear,
        }
    }
}

/// A finished run: the palette and the pattern that indexes into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantized {
    pub palette: Vec<PaletteEntry>,
    pub pattern: Pattern,
}

impl Quantized {
    /// The palette entry a cell should be filled with.
    pub fn cell(&self, x: u32, y: u32) -> Option<&PaletteEntry> {
        self.pattern
            .index_at(x, y)
            .and_then(|idx| self.palette.get(idx))
    }

    pub fn width(&self) -> u32 {
        self.pattern.width()
    }

    pub fn height(&self) -> u32 {
        self.pattern.height()
    }

    /// Symbols laid out like the grid, one string per row.
    pub fn symbol_rows(&self) -> Vec<String> {
        self.pattern
            .rows()
            .map(|row| row.iter().map(|&idx| self.palette[idx].symbol).collect())
            .collect()
    }
}

/// Runs the whole pipeline: sample, count, select, materialize.
pub fn quantize<S>(source: &S, config: &QuantizeConfig) -> Result<Quantized, QuantizeError>
where
    S: SampleSource + ?Sized,
{
    let grid = ColorSampleGrid::from_source(
        source,
        config.grid_width,
        config.grid_height,
        config.filter,
    )?;
    quantize_grid(&grid, config.max_colors)
}

/// The pipeline from an already sampled grid onwards.
pub fn quantize_grid(grid: &ColorSampleGrid, max_colors: usize) -> Result<Quantized, QuantizeError> {
    let records = frequency_index(grid);
    let palette = select_palette(&records, max_colors)?;
    let pattern = materialize(grid, &palette)?;

    log::info!(
        "quantized {}x{} grid: {} distinct colors -> {} palette entries",
        grid.width(),
        grid.height(),
        records.len(),
        palette.len()
    );

    Ok(Quantized { palette, pattern })
}

/// Decodes an encoded image (PNG, JPEG, ...) and quantizes it.
pub fn quantize_bytes(bytes: &[u8], config: &QuantizeConfig) -> Result<Quantized, QuantizeError> {
    let image = image::load_from_memory(bytes)?;
    quantize(&image, config)
}

/// Quantizes a raw RGBA8 buffer of `width` x `height` source pixels.
pub fn quantize_rgba(
    bytes: &[u8],
    width: u32,
    height: u32,
    config: &QuantizeConfig,
) -> Result<Quantized, QuantizeError> {
    let frame = RgbaFrame::new(bytes, width, height)?;
    quantize(&frame, config)
}
