//! Description backend for an Ollama server's `/api/generate` endpoint.

use async_trait::async_trait;
use image::DynamicImage;
use indexmap::IndexSet;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::common::{Detection, encode_png_base64};
use crate::description::backend::DescriptionBackend;
use crate::error::DescribeError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "knoopx/mobile-vlm:3b-fp16";
pub const DEFAULT_MAX_SIDE: u32 = 224;

#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    images: Vec<String>,
}

/// Prompt naming each detected class once, in the order first seen.
pub fn build_prompt(detections: &[Detection]) -> String {
    let classes: IndexSet<&str> = detections.iter().map(|d| d.class_name.as_str()).collect();
    let classes: Vec<&str> = classes.into_iter().collect();
    format!(
        "Briefly describe the image focusing on {}.",
        classes.join(", ")
    )
}

/// Pull the generated text out of a `/api/generate` response body.
pub fn parse_response(body: &serde_json::Value) -> Result<String, DescribeError> {
    body.get("response")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            DescribeError::ContractViolation(format!("missing `response` field in {}", body))
        })
}

pub struct OllamaBackend {
    client: Client,
    endpoint: String,
    model: String,
    max_side: u32,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, DescribeError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Ollama describer configured: endpoint={}, model={}",
            endpoint, model
        );
        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
            max_side: DEFAULT_MAX_SIDE,
        })
    }

    pub fn with_max_side(mut self, max_side: u32) -> Self {
        self.max_side = max_side;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl DescriptionBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn max_side(&self) -> u32 {
        self.max_side
    }

    async fn describe_image(
        &self,
        image: &DynamicImage,
        detections: &[Detection],
    ) -> Result<String, DescribeError> {
        let prompt = build_prompt(detections);
        info!("Using Ollama prompt: {}", prompt);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            images: vec![encode_png_base64(image)?],
        };

        let body: serde_json::Value = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("Response from Ollama: {}", body);

        parse_response(&body)
    }
}
