use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{DetectedImage, Detection, encode_png_base64};

/// How a request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionStatus {
    /// The scene was described.
    Success,
    /// The scene matched the previous one, no description was produced.
    Indifferent,
    /// The describer was already working on another scene.
    Busy,
}

impl fmt::Display for DescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionStatus::Success => write!(f, "success"),
            DescriptionStatus::Indifferent => write!(f, "indifferent"),
            DescriptionStatus::Busy => write!(f, "busy"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DescribedImage {
    image: Arc<DetectedImage>,
    description: String,
    status: DescriptionStatus,
    elapsed: Option<Duration>,
}

impl DescribedImage {
    pub fn success(image: Arc<DetectedImage>, description: String, elapsed: Duration) -> Self {
        Self {
            image,
            description,
            status: DescriptionStatus::Success,
            elapsed: Some(elapsed),
        }
    }

    pub fn indifferent(image: Arc<DetectedImage>) -> Self {
        Self {
            image,
            description: String::new(),
            status: DescriptionStatus::Indifferent,
            elapsed: None,
        }
    }

    pub fn busy(image: Arc<DetectedImage>) -> Self {
        Self {
            image,
            description: String::new(),
            status: DescriptionStatus::Busy,
            elapsed: None,
        }
    }

    /// Keeps status and description but swaps in a different image and timing.
    pub fn rewrap(self, image: Arc<DetectedImage>, elapsed: Duration) -> Self {
        Self {
            image,
            elapsed: Some(elapsed),
            ..self
        }
    }

    pub fn image(&self) -> &Arc<DetectedImage> {
        &self.image
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> DescriptionStatus {
        self.status
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Elapsed seconds, or `-1.0` when nothing was measured.
    pub fn time_secs(&self) -> f64 {
        self.elapsed.map(|d| d.as_secs_f64()).unwrap_or(-1.0)
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            status: self.status,
            description: self.description.clone(),
            detections: self.image.detections().to_vec(),
            time: self.time_secs(),
            captured_at: self.image.captured_at(),
            image: None,
        }
    }

    /// Like [`report`](Self::report), with the annotated image attached as a base64 PNG.
    pub fn report_with_image(&self) -> Result<AnalysisReport, ImageError> {
        let annotated = DynamicImage::ImageRgb8(self.image.annotated().clone());
        Ok(AnalysisReport {
            image: Some(encode_png_base64(&annotated)?),
            ..self.report()
        })
    }
}

/// Serializable summary handed to hosts.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub status: DescriptionStatus,
    pub description: String,
    pub detections: Vec<Detection>,
    pub time: f64,
    pub captured_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use image::{Rgb, RgbImage};

    fn detected() -> Arc<DetectedImage> {
        Arc::new(DetectedImage::new(
            Arc::new(DynamicImage::new_rgb8(4, 4)),
            RgbImage::from_pixel(6, 5, Rgb([200, 30, 30])),
            vec![Detection::new([0.0, 0.0, 1.0, 1.0], 0.9, 16, "dog")],
        ))
    }

    #[test]
    fn unmeasured_time_reports_sentinel() {
        let described = DescribedImage::busy(detected());
        assert_eq!(described.time_secs(), -1.0);
        assert_eq!(described.description(), "");
    }

    #[test]
    fn report_serializes_lowercase_status() {
        let described = DescribedImage::success(
            detected(),
            "a dog".to_string(),
            Duration::from_millis(1500),
        );
        let json = serde_json::to_value(described.report()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["description"], "a dog");
        assert_eq!(json["detections"][0]["class_name"], "dog");
        assert_eq!(json["time"], 1.5);
        assert!(json["captured_at"].is_string());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn report_with_image_carries_annotated_png() {
        let described = DescribedImage::indifferent(detected());
        let report = described.report_with_image().unwrap();
        assert_eq!(report.status, DescriptionStatus::Indifferent);
        assert_eq!(report.captured_at, described.image().captured_at());

        let bytes = STANDARD.decode(report.image.unwrap()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (6, 5));
        assert_eq!(*decoded.get_pixel(3, 2), Rgb([200, 30, 30]));
    }

    #[test]
    fn rewrap_keeps_status_and_text() {
        let original = DescribedImage::success(detected(), "text".into(), Duration::from_secs(1));
        let other = detected();
        let rewrapped = original.rewrap(other.clone(), Duration::from_secs(3));
        assert_eq!(rewrapped.status(), DescriptionStatus::Success);
        assert_eq!(rewrapped.description(), "text");
        assert!(Arc::ptr_eq(rewrapped.image(), &other));
        assert_eq!(rewrapped.elapsed(), Some(Duration::from_secs(3)));
    }
}
