use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::info;

use crate::common::{DescribedImage, DetectedImage};
use crate::description::backend::DescriptionBackend;
use crate::error::DescribeError;

/// Holds the describer's busy flag for as long as it lives.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Wraps a description backend with downscaling, timing and a single-flight
/// guard: while one description is in progress every other call is turned
/// away as busy instead of queueing behind it.
pub struct Describer {
    backend: Box<dyn DescriptionBackend>,
    processing: AtomicBool,
}

impl Describer {
    pub fn new(backend: Box<dyn DescriptionBackend>) -> Self {
        Self {
            backend,
            processing: AtomicBool::new(false),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_busy(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Downscale so neither side exceeds the backend's limit. Smaller images pass through.
    pub fn preprocess(&self, image: &DynamicImage) -> DynamicImage {
        let max_side = self.backend.max_side();
        let (width, height) = image.dimensions();
        if width <= max_side && height <= max_side {
            return image.clone();
        }

        let scale = f64::min(
            max_side as f64 / width as f64,
            max_side as f64 / height as f64,
        );
        let new_w = ((width as f64 * scale).round() as u32).max(1);
        let new_h = ((height as f64 * scale).round() as u32).max(1);
        image.resize_exact(new_w, new_h, FilterType::CatmullRom)
    }

    pub async fn describe(&self, image: Arc<DetectedImage>) -> Result<DescribedImage, DescribeError> {
        let Some(_guard) = BusyGuard::try_acquire(&self.processing) else {
            info!("Already processing an image");
            return Ok(DescribedImage::busy(image));
        };

        let start = Instant::now();
        let resized = self.preprocess(image.image());
        let description = self
            .backend
            .describe_image(&resized, image.detections())
            .await?;
        let elapsed = start.elapsed();

        info!(
            "Described the image in {:.2} seconds, description: {}",
            elapsed.as_secs_f64(),
            description
        );
        Ok(DescribedImage::success(image, description, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DescriptionStatus, Detection};
    use crate::description::backends::SimulatedDescriptionBackend;
    use async_trait::async_trait;
    use image::RgbImage;
    use std::time::Duration;

    fn detected(width: u32, height: u32) -> Arc<DetectedImage> {
        Arc::new(DetectedImage::new(
            Arc::new(DynamicImage::new_rgb8(width, height)),
            RgbImage::new(8, 8),
            vec![Detection::new([0.0, 0.0, 1.0, 1.0], 0.9, 16, "dog")],
        ))
    }

    struct FailingBackend;

    #[async_trait]
    impl DescriptionBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn max_side(&self) -> u32 {
            64
        }

        async fn describe_image(
            &self,
            _image: &DynamicImage,
            _detections: &[Detection],
        ) -> Result<String, DescribeError> {
            Err(DescribeError::ContractViolation("no response field".into()))
        }
    }

    struct SizeReportingBackend;

    #[async_trait]
    impl DescriptionBackend for SizeReportingBackend {
        fn name(&self) -> &'static str {
            "size"
        }

        fn max_side(&self) -> u32 {
            100
        }

        async fn describe_image(
            &self,
            image: &DynamicImage,
            _detections: &[Detection],
        ) -> Result<String, DescribeError> {
            Ok(format!("{}x{}", image.width(), image.height()))
        }
    }

    #[test]
    fn preprocess_downscales_preserving_aspect() {
        let describer = Describer::new(Box::new(SizeReportingBackend));
        let resized = describer.preprocess(&DynamicImage::new_rgb8(400, 200));
        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn preprocess_leaves_small_images_alone() {
        let describer = Describer::new(Box::new(SizeReportingBackend));
        let small = describer.preprocess(&DynamicImage::new_rgb8(80, 20));
        assert_eq!(small.dimensions(), (80, 20));
    }

    #[tokio::test]
    async fn test_describe_success_is_timed() {
        let describer = Describer::new(Box::new(SizeReportingBackend));
        let described = describer.describe(detected(300, 150)).await.unwrap();
        assert_eq!(described.status(), DescriptionStatus::Success);
        assert_eq!(described.description(), "100x50");
        assert!(described.time_secs() >= 0.0);
        assert!(!describer.is_busy());
    }

    #[tokio::test]
    async fn test_overlapping_describe_is_rejected_as_busy() {
        let backend = SimulatedDescriptionBackend::new().with_delay(Duration::from_millis(50));
        let describer = Describer::new(Box::new(backend));

        let (first, second) = tokio::join!(
            describer.describe(detected(32, 32)),
            describer.describe(detected(32, 32))
        );
        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(first.status(), DescriptionStatus::Success);
        assert!(!first.description().is_empty());
        assert_eq!(second.status(), DescriptionStatus::Busy);
        assert_eq!(second.description(), "");
        assert_eq!(second.time_secs(), -1.0);
    }

    #[tokio::test]
    async fn test_flag_is_released_after_backend_error() {
        let describer = Describer::new(Box::new(FailingBackend));
        assert!(describer.describe(detected(8, 8)).await.is_err());
        assert!(!describer.is_busy());
        // a second attempt reaches the backend again instead of reporting busy
        assert!(describer.describe(detected(8, 8)).await.is_err());
    }

    #[tokio::test]
    async fn test_flag_is_released_when_describe_is_dropped() {
        let backend = SimulatedDescriptionBackend::new().with_delay(Duration::from_secs(5));
        let describer = Describer::new(Box::new(backend));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), describer.describe(detected(8, 8)))
                .await;
        assert!(abandoned.is_err());
        assert!(!describer.is_busy());
    }
}
