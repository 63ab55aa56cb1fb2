use async_trait::async_trait;
use image::RgbImage;

use crate::common::Detection;
use crate::error::DetectError;

/// Detection backend capability.
///
/// A backend receives an image that has already been letterboxed to
/// [`DetectionBackend::input_size`] and returns the objects it found, with
/// boxes normalized to that image. Implementations may suspend while waiting
/// on a separate inference thread or device.
#[async_trait]
pub trait DetectionBackend: Send + Sync {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Fixed `(width, height)` the backend expects its input letterboxed to.
    fn input_size(&self) -> (u32, u32);

    /// Run inference on a preprocessed image.
    async fn detect_objects(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError>;
}
