use async_trait::async_trait;
use image::RgbImage;

use crate::common::Detection;
use crate::detection::backend::DetectionBackend;
use crate::error::DetectError;

/// Software backend that reports a fixed set of detections for every image.
pub struct SimulatedDetectionBackend {
    width: u32,
    height: u32,
    detections: Vec<Detection>,
}

impl SimulatedDetectionBackend {
    pub fn new() -> Self {
        Self {
            width: 300,
            height: 300,
            detections: vec![Detection::new([0.1, 0.1, 0.9, 0.9], 0.9, 0, "dummy")],
        }
    }

    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_detections(mut self, detections: Vec<Detection>) -> Self {
        self.detections = detections;
        self
    }
}

impl Default for SimulatedDetectionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DetectionBackend for SimulatedDetectionBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    async fn detect_objects(&self, _image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        Ok(self.detections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_single_dummy_by_default() {
        let backend = SimulatedDetectionBackend::new();
        let detections = backend
            .detect_objects(&RgbImage::new(300, 300))
            .await
            .unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_name, "dummy");
        assert_eq!(backend.input_size(), (300, 300));
    }
}
