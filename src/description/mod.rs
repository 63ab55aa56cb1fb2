mod backend;
mod backends;
mod describer;

pub use backend::DescriptionBackend;
pub use backends::ollama::{DEFAULT_ENDPOINT, DEFAULT_MAX_SIDE, DEFAULT_MODEL, build_prompt};
pub use backends::{OllamaBackend, SimulatedDescriptionBackend};
pub use describer::Describer;
