//! WebAssembly interface for browser front ends.
//!
//! The front end hands over either the uploaded file's bytes or the RGBA
//! buffer of a canvas, then asks for a pattern. Results come back as JSON.

use image::{DynamicImage, RgbaImage};
use wasm_bindgen::prelude::*;

use crate::{PatternSession, QuantizeConfig, QuantizeError, Quantized, Resample};

#[wasm_bindgen]
pub struct PatternStudio {
    session: PatternSession,
}

#[wasm_bindgen]
impl PatternStudio {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            session: PatternSession::new(QuantizeConfig::default()),
        }
    }

    pub fn set_grid_size(&mut self, size: u32) {
        let config = self.session.config_mut();
        config.grid_width = size;
        config.grid_height = size;
    }

    pub fn set_grid_dimensions(&mut self, width: u32, height: u32) {
        let config = self.session.config_mut();
        config.grid_width = width;
        config.grid_height = height;
    }

    pub fn set_color_count(&mut self, colors: usize) {
        self.session.config_mut().max_colors = colors;
    }

    pub fn set_smoothing(&mut self, enabled: bool) {
        self.session.config_mut().filter = if enabled {
            Resample::Bilinear
        } else {
            Resample::Nearest
        };
    }

    pub fn has_image(&self) -> bool {
        self.session.has_image()
    }

    pub fn load_encoded(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.session.load_image_bytes(bytes).map_err(to_js)
    }

    pub fn load_rgba(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), JsValue> {
        self.load_rgba_inner(pixels, width, height).map_err(to_js)
    }

    /// Runs the pipeline and returns `{palette, pattern}` as JSON.
    pub fn process(&mut self) -> Result<String, JsValue> {
        self.process_inner().map_err(to_js)
    }

    /// The last successful result as JSON, if any.
    pub fn current(&self) -> Option<String> {
        self.session
            .current()
            .and_then(|result| serde_json::to_string(result.as_ref()).ok())
    }
}

impl Default for PatternStudio {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternStudio {
    fn load_rgba_inner(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), QuantizeError> {
        let image = RgbaImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| {
            QuantizeError::InvalidImage(format!(
                "buffer of {} bytes does not hold a {width}x{height} RGBA image",
                pixels.len()
            ))
        })?;
        self.session.load_image(DynamicImage::ImageRgba8(image));
        Ok(())
    }

    fn process_inner(&mut self) -> Result<String, QuantizeError> {
        let result = self.session.process()?;
        Ok(to_json(&result))
    }
}

fn to_json(result: &Quantized) -> String {
    // plain structs of numbers and chars always serialize
    serde_json::to_string(result).unwrap_or_default()
}

fn to_js(err: QuantizeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
