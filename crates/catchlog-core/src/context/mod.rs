//! Structural context around logging calls: nesting flags, positional
//! counts, and line spans.

mod analyzer;
mod types;

pub use analyzer::ContextAnalyzer;
pub use types::ContextMetrics;
