use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;

use crate::common::Detection;

/// The outcome of running a detector over one image.
///
/// Holds the caller's original image, the letterboxed copy with every
/// detection drawn on it, and the detections in backend order.
#[derive(Debug, Clone)]
pub struct DetectedImage {
    image: Arc<DynamicImage>,
    annotated: RgbImage,
    detections: Vec<Detection>,
    captured_at: DateTime<Utc>,
}

impl DetectedImage {
    pub fn new(image: Arc<DynamicImage>, annotated: RgbImage, detections: Vec<Detection>) -> Self {
        Self {
            image,
            annotated,
            detections,
            captured_at: Utc::now(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn annotated(&self) -> &RgbImage {
        &self.annotated
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
