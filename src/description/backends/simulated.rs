use async_trait::async_trait;
use image::DynamicImage;
use std::time::Duration;

use crate::common::Detection;
use crate::description::backend::DescriptionBackend;
use crate::error::DescribeError;

/// Software stand-in for a slow description model.
pub struct SimulatedDescriptionBackend {
    delay: Duration,
    max_side: u32,
    description: String,
}

impl SimulatedDescriptionBackend {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_secs(3),
            max_side: 128,
            description: "A dummy description".to_string(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_side(mut self, max_side: u32) -> Self {
        self.max_side = max_side;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Default for SimulatedDescriptionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DescriptionBackend for SimulatedDescriptionBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn max_side(&self) -> u32 {
        self.max_side
    }

    async fn describe_image(
        &self,
        _image: &DynamicImage,
        _detections: &[Detection],
    ) -> Result<String, DescribeError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.description.clone())
    }
}
