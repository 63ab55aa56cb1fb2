use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Analyze Error: {0}")]
    Analyze(#[from] AnalyzeError),
    #[error("Failed to build backend: {0}")]
    Backend(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

// Errors raised while turning an image into detections.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Cannot process an image with zero width or height")]
    EmptyImage,
    #[error("Detection backend broke its output contract: {0}")]
    ContractViolation(String),
    #[error("The inference worker has stopped")]
    WorkerStopped,
    #[error("Inference device failed: {0}")]
    Device(#[from] DeviceError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("Device rejected input of {width}x{height}, expected {expected_width}x{expected_height}")]
    InputShape {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("Device fault: {0}")]
    Fault(String),
}

// Errors raised by description backends.
#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("Description backend broke its response contract: {0}")]
    ContractViolation(String),
    #[error("Failed to reach description backend: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to encode image for description: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Detection failed: {0}")]
    Detect(#[from] DetectError),
    #[error("Description failed: {0}")]
    Describe(#[from] DescribeError),
}
