mod annotation;
mod backend;
mod backends;
mod detector;
mod device;
mod font;
mod labels;
mod preprocessing;

pub use annotation::{class_color, draw_detections};
pub use backend::DetectionBackend;
pub use backends::{AcceleratorBackend, SimulatedDetectionBackend};
pub use detector::Detector;
pub use device::{InferenceDevice, OutputTensor, SyntheticDevice};
pub use labels::{COCO_LABELS, coco_labels, load_labels};
pub use preprocessing::{PADDING_COLOR, letterbox};
