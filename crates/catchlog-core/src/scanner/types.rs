//! Scanner configuration and result types.

use std::path::PathBuf;

use serde::Serialize;

/// Controls which files a scan selects.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Project root to walk.
    pub root: PathBuf,
    /// Include globs relative to the root. Empty selects `**/*.java`.
    pub include: Vec<String>,
    /// Exclude globs applied after includes.
    pub exclude: Vec<String>,
    /// Keep files following the `*Test.java` naming convention.
    pub include_tests: bool,
    /// Honor .gitignore files found during the walk.
    pub respect_gitignore: bool,
    /// Skip files larger than this many bytes.
    pub max_file_size: u64,
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include: Vec::new(),
            exclude: Vec::new(),
            include_tests: false,
            respect_gitignore: true,
            max_file_size: 4 * 1024 * 1024,
        }
    }
}

/// One file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScannedFile {
    /// Root-relative display path, forward slashes on every platform.
    pub path: String,
    /// Absolute path used for reading.
    pub abs_path: PathBuf,
    pub size: u64,
}

/// Output of one scan pass.
#[derive(Debug)]
pub struct ScanResult {
    pub root: PathBuf,
    /// Selected files, sorted by display path.
    pub files: Vec<ScannedFile>,
    pub stats: ScanStats,
}

/// Counters from one scan pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub files_seen: usize,
    pub files_selected: usize,
    pub files_skipped: usize,
    pub duration_ms: u64,
}
