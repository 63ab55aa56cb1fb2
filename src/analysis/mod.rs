mod analyzer;
mod change_gate;
mod history;

pub use analyzer::Analyzer;
pub use change_gate::{ClassCounts, is_different};
pub use history::{History, HistoryStats};
