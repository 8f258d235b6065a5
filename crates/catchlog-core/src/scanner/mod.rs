//! Filesystem discovery of the Java sources to analyze.

mod types;
mod walker;

pub use types::{ScanConfig, ScanResult, ScanStats, ScannedFile};
pub use walker::{is_test_file, Scanner};
