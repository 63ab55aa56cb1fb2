pub mod accelerator;
pub mod simulated;

pub use accelerator::AcceleratorBackend;
pub use simulated::SimulatedDetectionBackend;
