use std::sync::Arc;

use image::DynamicImage;

use crate::{quantize, QuantizeConfig, QuantizeError, Quantized};

/// Owns the loaded image, the current settings and the last published result.
///
/// `process` needs `&mut self`, so a session never runs two pipelines at once.
/// Results are handed out as `Arc`s: a reader keeps whichever complete result
/// it cloned, and a failed run leaves the previous one in place.
#[derive(Debug, Default)]
pub struct PatternSession {
    image: Option<DynamicImage>,
    config: QuantizeConfig,
    current: Option<Arc<Quantized>>,
}

impl PatternSession {
    pub fn new(config: QuantizeConfig) -> Self {
        Self {
            image: None,
            config,
            current: None,
        }
    }

    pub fn load_image(&mut self, image: DynamicImage) {
        log::debug!("loaded image {}x{}", image.width(), image.height());
        self.image = Some(image);
    }

    /// Decodes and loads an encoded image. On failure the previous image stays.
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> Result<(), QuantizeError> {
        let image = image::load_from_memory(bytes)?;
        self.load_image(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn config(&self) -> &QuantizeConfig {
        &self.config
    }

    /// New settings apply from the next `process` call.
    pub fn set_config(&mut self, config: QuantizeConfig) {
        self.config = config;
    }

    pub fn config_mut(&mut self) -> &mut QuantizeConfig {
        &mut self.config
    }

    /// Runs the pipeline on the loaded image and publishes the result.
    pub fn process(&mut self) -> Result<Arc<Quantized>, QuantizeError> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| QuantizeError::InvalidImage("no image has been loaded".into()))?;

        let result = Arc::new(quantize(image, &self.config)?);
        self.current = Some(Arc::clone(&result));
        Ok(result)
    }

    pub fn current(&self) -> Option<Arc<Quantized>> {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn striped() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(6, 6, |x, _| {
            if x % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        }))
    }

    #[test]
    fn processing_without_image_fails() {
        let mut session = PatternSession::default();
        assert!(!session.has_image());
        let err = session.process().unwrap_err();
        assert!(matches!(err, QuantizeError::InvalidImage(_)));
        assert!(session.current().is_none());
    }

    #[test]
    fn failed_run_keeps_previous_result() {
        let mut session = PatternSession::new(QuantizeConfig::square(6, 4));
        session.load_image(striped());
        let first = session.process().expect("first run");

        session.config_mut().grid_width = 0;
        let err = session.process().unwrap_err();
        assert!(matches!(err, QuantizeError::InvalidDimensions { .. }));

        let current = session.current().expect("previous result kept");
        assert!(Arc::ptr_eq(&first, &current));
    }

    #[test]
    fn new_run_replaces_result_without_touching_readers() {
        let mut session = PatternSession::new(QuantizeConfig::square(6, 4));
        session.load_image(striped());
        let old = session.process().expect("first run");

        session.set_config(QuantizeConfig::square(3, 4));
        let new = session.process().expect("second run");

        assert_eq!(old.width(), 6);
        assert_eq!(new.width(), 3);
        assert!(Arc::ptr_eq(&new, &session.current().expect("published")));
    }

    #[test]
    fn bad_bytes_leave_loaded_image() {
        let mut session = PatternSession::default();
        session.load_image(striped());
        assert!(session.load_image_bytes(b"garbage").is_err());
        assert!(session.has_image());

        session.clear_image();
        assert!(!session.has_image());
    }
}
