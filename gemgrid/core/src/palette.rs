use serde::{Deserialize, Serialize};

use crate::color::{nearest_index, Rgb};
use crate::frequency::FrequencyRecord;
use crate::QuantizeError;

/// Symbols handed out by palette rank. Ranks past the end wrap around.
pub const SYMBOL_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn symbol_for_rank(rank: usize) -> char {
    char::from(SYMBOL_ALPHABET[rank % SYMBOL_ALPHABET.len()])
}

/// One color of the final palette and how many cells it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: Rgb,
    pub symbol: char,
    pub count: usize,
}

/// Picks at most `max_colors` entries from frequency-ordered `records`.
///
/// When there are more distinct colors than the budget allows, the most
/// frequent ones are kept and every other color adds its count to the kept
/// color nearest to it. Kept colors are never moved. A budget of zero keeps
/// one color.
pub fn select_palette(
    records: &[FrequencyRecord],
    max_colors: usize,
) -> Result<Vec<PaletteEntry>, QuantizeError> {
    if records.is_empty() {
        return Err(QuantizeError::EmptyPalette);
    }

    let budget = max_colors.max(1);
    let (kept, folded) = records.split_at(records.len().min(budget));

    let mut palette: Vec<PaletteEntry> = kept
        .iter()
        .enumerate()
        .map(|(rank, record)| PaletteEntry {
            color: record.color,
            symbol: symbol_for_rank(rank),
            count: record.count,
        })
        .collect();

    if !folded.is_empty() {
        log::debug!(
            "folding {} colors into a palette of {}",
            folded.len(),
            palette.len()
        );
    }

    for record in folded {
        let target = nearest_index(record.color, palette.iter().map(|entry| entry.color));
        palette[target].count += record.count;
    }

    Ok(palette)
}
