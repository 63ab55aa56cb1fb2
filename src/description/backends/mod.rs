pub mod ollama;
pub mod simulated;

pub use ollama::OllamaBackend;
pub use simulated::SimulatedDescriptionBackend;
