use serde::{Deserialize, Serialize};

use crate::color::nearest_index;
use crate::palette::PaletteEntry;
use crate::sample::ColorSampleGrid;
use crate::QuantizeError;

/// The finished grid. Each cell stores the index of its palette entry, so many
/// cells share one entry; compare fill colors through the palette by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    width: u32,
    height: u32,
    cells: Vec<usize>,
}

impl Pattern {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Palette index of the cell at (`x`, `y`).
    pub fn index_at(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.cells.chunks(self.width as usize)
    }
}

/// Assigns every grid cell to its nearest palette entry.
pub fn materialize(grid: &ColorSampleGrid, palette: &[PaletteEntry]) -> Result<Pattern, QuantizeError> {
    if palette.is_empty() {
        return Err(QuantizeError::EmptyPalette);
    }

    let cells = grid
        .colors()
        .iter()
        .map(|&color| nearest_index(color, palette.iter().map(|entry| entry.color)))
        .collect();

    Ok(Pattern {
        width: grid.width(),
        height: grid.height(),
        cells,
    })
}
