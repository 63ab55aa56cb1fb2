mod described_image;
mod detected_image;
mod detection;
mod encoding;

pub use described_image::{AnalysisReport, DescribedImage, DescriptionStatus};
pub use detected_image::DetectedImage;
pub use detection::Detection;
pub use encoding::encode_png_base64;
