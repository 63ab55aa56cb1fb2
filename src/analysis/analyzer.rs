use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::analysis::change_gate::is_different;
use crate::analysis::history::{History, HistoryStats};
use crate::common::{DescribedImage, DescriptionStatus};
use crate::description::Describer;
use crate::detection::Detector;
use crate::error::AnalyzeError;

/// Detects objects in each submitted image and only asks for a new
/// description when the set of detected objects differs from the last
/// scene described for that user.
pub struct Analyzer {
    detector: Detector,
    describer: Describer,
    history: History,
}

impl Analyzer {
    pub fn new(detector: Detector, describer: Describer) -> Self {
        Self {
            detector,
            describer,
            history: History::new(),
        }
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn describer(&self) -> &Describer {
        &self.describer
    }

    pub async fn analyze(
        &self,
        user: &str,
        image: DynamicImage,
    ) -> Result<DescribedImage, AnalyzeError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analyze", user = %user, request = %request_id);
        let described = self.analyze_image(user, image).instrument(span).await?;
        info!(
            "Analysis for user {} finished with status {} in {:.2}s",
            user,
            described.status(),
            described.time_secs()
        );
        Ok(described)
    }

    async fn analyze_image(
        &self,
        user: &str,
        image: DynamicImage,
    ) -> Result<DescribedImage, AnalyzeError> {
        let start = Instant::now();
        let current = Arc::new(self.detector.detect(image).await?);
        let previous = self.history.last(user);

        if !is_different(&current, previous.as_deref()) {
            info!(
                "Scene for user {} is unchanged ({} objects), skipping description",
                user,
                current.detections().len()
            );
            return Ok(DescribedImage::indifferent(current));
        }

        info!("Describing a new scene for user {}", user);
        let described = self.describer.describe(current.clone()).await?;
        // The baseline only moves to scenes the describer actually took.
        if described.status() == DescriptionStatus::Busy {
            info!("Describer busy, keeping the previous baseline for user {}", user);
        } else {
            self.history.append(user, current.clone());
        }

        Ok(described.rewrap(current, start.elapsed()))
    }

    /// Forget everything seen for `user`. Unknown users are a no-op.
    pub fn refresh(&self, user: &str) {
        if self.history.remove(user) {
            info!("Refreshed image analyzer for user {}", user);
        } else {
            info!("User {} not found in history", user);
        }
    }

    pub fn history_len(&self, user: &str) -> usize {
        self.history.len(user)
    }

    pub fn stats(&self) -> HistoryStats {
        self.history.stats()
    }
}
