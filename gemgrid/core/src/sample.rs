use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::QuantizeError;

/// How a source image is scaled down to the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resample {
    Nearest,
    /// Same smoothing a browser canvas applies when drawing a scaled image.
    #[default]
    Bilinear,
}

impl From<Resample> for FilterType {
    fn from(filter: Resample) -> Self {
        match filter {
            Resample::Nearest => FilterType::Nearest,
            Resample::Bilinear => FilterType::Triangle,
        }
    }
}

/// Anything that can be scaled into a `width` x `height` RGBA raster.
pub trait SampleSource {
    fn sample(&self, width: u32, height: u32, filter: Resample) -> Result<RgbaImage, QuantizeError>;
}

impl SampleSource for RgbaImage {
    fn sample(&self, width: u32, height: u32, filter: Resample) -> Result<RgbaImage, QuantizeError> {
        if self.width() == 0 || self.height() == 0 {
            return Err(QuantizeError::InvalidImage("image has no pixels".into()));
        }
        if self.dimensions() == (width, height) {
            return Ok(self.clone());
        }
        Ok(imageops::resize(self, width, height, filter.into()))
    }
}

impl SampleSource for DynamicImage {
    fn sample(&self, width: u32, height: u32, filter: Resample) -> Result<RgbaImage, QuantizeError> {
        self.to_rgba8().sample(width, height, filter)
    }
}

/// A borrowed RGBA8 buffer, four bytes per pixel, row-major.
#[derive(Debug, Clone, Copy)]
pub struct RgbaFrame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> RgbaFrame<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, QuantizeError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(QuantizeError::InvalidImage(format!(
                "expected {expected} bytes for a {width}x{height} RGBA frame, got {}",
                data.len()
            )));
        }
        Ok(Self { data, width, height })
    }
}

impl SampleSource for RgbaFrame<'_> {
    fn sample(&self, width: u32, height: u32, filter: Resample) -> Result<RgbaImage, QuantizeError> {
        let image = RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
            .ok_or_else(|| QuantizeError::InvalidImage("frame buffer too small".into()))?;
        image.sample(width, height, filter)
    }
}

/// A cell coordinate inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

/// The image downsampled to working resolution, one color per cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSampleGrid {
    width: u32,
    height: u32,
    cells: Vec<Rgb>,
}

impl ColorSampleGrid {
    /// Scales `source` into a `width` x `height` grid and drops alpha.
    pub fn from_source<S>(
        source: &S,
        width: u32,
        height: u32,
        filter: Resample,
    ) -> Result<Self, QuantizeError>
    where
        S: SampleSource + ?Sized,
    {
        check_dimensions(width, height)?;
        let scaled = source.sample(width, height, filter)?;
        Self::from_rgba_bytes(scaled.as_raw(), width, height)
    }

    /// Reads an RGBA8 buffer that is already at grid resolution.
    pub fn from_rgba_bytes(bytes: &[u8], width: u32, height: u32) -> Result<Self, QuantizeError> {
        check_dimensions(width, height)?;
        let frame = RgbaFrame::new(bytes, width, height)?;
        let cells = frame
            .data
            .chunks_exact(4)
            .map(|px| Rgb::new(px[0], px[1], px[2]))
            .collect();
        Ok(Self { width, height, cells })
    }

    pub fn from_colors(width: u32, height: u32, cells: Vec<Rgb>) -> Result<Self, QuantizeError> {
        check_dimensions(width, height)?;
        if cells.len() != width as usize * height as usize {
            return Err(QuantizeError::InvalidImage(format!(
                "expected {} colors for a {width}x{height} grid, got {}",
                width as usize * height as usize,
                cells.len()
            )));
        }
        Ok(Self { width, height, cells })
    }

    /// Builds a grid from rows of equal length.
    pub fn from_rows(rows: &[Vec<Rgb>]) -> Result<Self, QuantizeError> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len() as u32);
        if rows.iter().any(|row| row.len() as u32 != width) {
            return Err(QuantizeError::InvalidImage("grid rows differ in length".into()));
        }
        Self::from_colors(width, height, rows.concat())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.cells
    }

    /// Every cell in row-major order (y outer, x inner).
    pub fn cells(&self) -> impl Iterator<Item = (Position, Rgb)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(idx, &color)| {
            let position = Position {
                x: (idx % width) as u32,
                y: (idx / width) as u32,
            };
            (position, color)
        })
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), QuantizeError> {
    if width == 0 || height == 0 {
        return Err(QuantizeError::InvalidDimensions { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn reads_bytes_row_major_and_drops_alpha() {
        let bytes = [
            255, 0, 0, 255, 0, 255, 0, 0, //
            0, 0, 255, 128, 9, 9, 9, 255,
        ];
        let grid = ColorSampleGrid::from_rgba_bytes(&bytes, 2, 2).expect("grid should build");

        assert_eq!(grid.get(0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(grid.get(1, 0), Some(Rgb::new(0, 255, 0)));
        assert_eq!(grid.get(0, 1), Some(Rgb::new(0, 0, 255)));
        assert_eq!(grid.get(1, 1), Some(Rgb::new(9, 9, 9)));
        assert_eq!(grid.get(2, 0), None);

        let positions: Vec<Position> = grid.cells().map(|(pos, _)| pos).collect();
        assert_eq!(positions[1], Position { x: 1, y: 0 });
        assert_eq!(positions[2], Position { x: 0, y: 1 });
    }

    #[test]
    fn rejects_zero_dimensions() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let err = ColorSampleGrid::from_source(&image, 0, 3, Resample::Nearest).unwrap_err();
        assert!(matches!(err, QuantizeError::InvalidDimensions { width: 0, height: 3 }));
    }

    #[test]
    fn rejects_empty_image_and_short_buffers() {
        let empty = RgbaImage::new(0, 0);
        let err = ColorSampleGrid::from_source(&empty, 2, 2, Resample::Bilinear).unwrap_err();
        assert!(matches!(err, QuantizeError::InvalidImage(_)));

        let err = RgbaFrame::new(&[0; 7], 1, 2).unwrap_err();
        assert!(matches!(err, QuantizeError::InvalidImage(_)));
    }

    #[test]
    fn downsamples_to_requested_size() {
        let image = RgbaImage::from_fn(8, 4, |x, _| {
            if x < 4 {
                Rgba([200, 10, 10, 255])
            } else {
                Rgba([10, 10, 200, 255])
            }
        });
        let grid = ColorSampleGrid::from_source(&image, 2, 1, Resample::Nearest).expect("grid");

        assert_eq!((grid.width(), grid.height()), (2, 1));
        assert_eq!(grid.colors(), &[Rgb::new(200, 10, 10), Rgb::new(10, 10, 200)]);
    }

    #[test]
    fn sampling_is_deterministic() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(17, 11, |x, y| {
            Rgba([(x * 13) as u8, (y * 21) as u8, ((x + y) * 7) as u8, 255])
        }));
        let first = ColorSampleGrid::from_source(&image, 5, 3, Resample::Bilinear).expect("grid");
        let second = ColorSampleGrid::from_source(&image, 5, 3, Resample::Bilinear).expect("grid");
        assert_eq!(first, second);
        assert_eq!(first.len(), 15);
    }

    #[test]
    fn rows_must_be_rectangular() {
        let red = Rgb::new(255, 0, 0);
        let err = ColorSampleGrid::from_rows(&[vec![red, red], vec![red]]).unwrap_err();
        assert!(matches!(err, QuantizeError::InvalidImage(_)));

        let err = ColorSampleGrid::from_rows(&[]).unwrap_err();
        assert!(matches!(err, QuantizeError::InvalidDimensions { .. }));
    }
}
