use async_trait::async_trait;
use image::DynamicImage;

use crate::common::Detection;
use crate::error::DescribeError;

/// Description backend capability.
#[async_trait]
pub trait DescriptionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Longest side, in pixels, the backend wants to receive.
    fn max_side(&self) -> u32;

    /// Produce free text for an image already downscaled to [`Self::max_side`],
    /// conditioned on what the detector found in it.
    async fn describe_image(
        &self,
        image: &DynamicImage,
        detections: &[Detection],
    ) -> Result<String, DescribeError>;
}
