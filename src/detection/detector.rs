use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use tracing::{debug, info};

use crate::common::DetectedImage;
use crate::detection::annotation::draw_detections;
use crate::detection::backend::DetectionBackend;
use crate::detection::preprocessing::{PADDING_COLOR, letterbox};
use crate::error::DetectError;

/// Letterboxes, runs a detection backend and annotates the result.
pub struct Detector {
    backend: Box<dyn DetectionBackend>,
}

impl Detector {
    pub fn new(backend: Box<dyn DetectionBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn input_size(&self) -> (u32, u32) {
        self.backend.input_size()
    }

    /// Letterbox to the backend's input size.
    pub fn preprocess(&self, image: &DynamicImage) -> Result<RgbImage, DetectError> {
        let (width, height) = self.backend.input_size();
        letterbox(image, width, height, PADDING_COLOR)
    }

    pub async fn detect(&self, image: DynamicImage) -> Result<DetectedImage, DetectError> {
        let mut annotated = self.preprocess(&image)?;
        let detections = self.backend.detect_objects(&annotated).await?;
        draw_detections(&mut annotated, &detections);

        info!(
            "Detected {} objects with backend {}",
            detections.len(),
            self.backend.name()
        );
        for detection in &detections {
            debug!(
                "  {} (class {}) score={:.2} box={:?}",
                detection.class_name, detection.class_id, detection.score, detection.bbox
            );
        }

        Ok(DetectedImage::new(Arc::new(image), annotated, detections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Detection;
    use crate::detection::annotation::class_color;
    use crate::detection::backends::{AcceleratorBackend, SimulatedDetectionBackend};
    use crate::detection::device::SyntheticDevice;
    use image::{ImageBuffer, Rgb};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(color)))
    }

    #[tokio::test]
    async fn test_detect_letterboxes_and_annotates() {
        let detector = Detector::new(Box::new(
            SimulatedDetectionBackend::new().with_input_size(100, 100),
        ));
        let detected = detector.detect(solid(400, 200, [0, 0, 0])).await.unwrap();

        assert_eq!(detected.image().width(), 400);
        assert_eq!(detected.annotated().dimensions(), (100, 100));
        assert_eq!(detected.detections().len(), 1);
        // left edge of the dummy box sits at x = 10
        assert_eq!(*detected.annotated().get_pixel(10, 60), class_color(0));
    }

    #[tokio::test]
    async fn test_no_detections_leaves_preprocessed_image_untouched() {
        let detector = Detector::new(Box::new(
            SimulatedDetectionBackend::new()
                .with_input_size(50, 50)
                .with_detections(vec![]),
        ));
        let image = solid(50, 50, [9, 9, 9]);
        let detected = detector.detect(image.clone()).await.unwrap();
        assert_eq!(detected.annotated().as_raw(), image.to_rgb8().as_raw());
    }

    #[tokio::test]
    async fn test_detect_through_accelerator() {
        let labels = vec!["cat".to_string(), "dog".to_string()];
        let device = SyntheticDevice::new(64, 64, 2);
        let detector = Detector::new(Box::new(AcceleratorBackend::spawn(device, labels)));

        let detected = detector.detect(solid(128, 64, [200, 0, 0])).await.unwrap();
        let names: Vec<&str> = detected
            .detections()
            .iter()
            .map(|d| d.class_name.as_str())
            .collect();
        assert_eq!(names, vec!["dog"]);
        // the box covers the centered 64x32 content band
        let Detection { bbox, .. } = &detected.detections()[0];
        assert_eq!(*bbox, [0.25, 0.0, 0.75, 1.0]);
    }

    #[tokio::test]
    async fn test_empty_image_fails_before_backend() {
        let detector = Detector::new(Box::new(SimulatedDetectionBackend::new()));
        let result = detector.detect(DynamicImage::new_rgb8(0, 0)).await;
        assert!(matches!(result, Err(DetectError::EmptyImage)));
    }
}
