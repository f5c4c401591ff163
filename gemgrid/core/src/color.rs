use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque sRGB triple. Two colors are the same color only when every
/// channel matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance in RGB space.
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<image::Rgba<u8>> for Rgb {
    fn from(pixel: image::Rgba<u8>) -> Self {
        let [r, g, b, _] = pixel.0;
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Index of the color in `candidates` closest to `target`.
///
/// Only a strictly smaller distance replaces the current best, so the earliest
/// candidate wins ties. Returns 0 for an empty slice; callers guarantee a
/// non-empty palette before searching.
pub fn nearest_index<I>(target: Rgb, candidates: I) -> usize
where
    I: IntoIterator<Item = Rgb>,
{
    let mut best = 0;
    let mut best_dist = f64::INFINITY;

    for (idx, color) in candidates.into_iter().enumerate() {
        let dist = target.distance(color);
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }

    best
}
