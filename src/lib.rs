pub mod analysis;
pub mod common;
pub mod config;
pub mod description;
pub mod detection;
pub mod error;
pub mod factory;
pub mod service;

pub use analysis::Analyzer;
pub use common::{AnalysisReport, DescribedImage, DescriptionStatus, DetectedImage, Detection};
pub use config::Settings;
pub use error::{AnalyzeError, AppError, DescribeError, DetectError};
pub use service::{AnalyzeRequest, AnalyzeResponse, AnalyzeService};
