//! Source discovery built on the ignore-aware walker.
//!
//! The walk itself is sequential; selection is cheap and parsing is
//! where the parallelism lives. Output order is sorted so downstream
//! records are stable across runs.

use std::path::Path;
use std::time::Instant;

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::ScanError;
use crate::scanner::types::{ScanConfig, ScanResult, ScanStats, ScannedFile};

static TEST_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*Test\.java$").expect("test file pattern"));

/// Walks the project root and selects the Java sources to analyze.
pub struct Scanner {
    config: ScanConfig,
    include: GlobSet,
    exclude: GlobSet,
}

impl Scanner {
    /// Builds a scanner, compiling the configured glob patterns.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        if !config.root.is_dir() {
            return Err(ScanError::MissingRoot(config.root.clone()));
        }
        let include_patterns: Vec<String> = if config.include.is_empty() {
            vec!["**/*.java".to_string()]
        } else {
            config.include.clone()
        };
        let include = build_globset(&include_patterns)?;
        let exclude = build_globset(&config.exclude)?;
        Ok(Self {
            config,
            include,
            exclude,
        })
    }

    /// Scans the filesystem. Unreadable entries are skipped with a
    /// warning, never fatal.
    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let mut stats = ScanStats::default();
        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.config.root)
            .git_ignore(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .git_global(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "walk error, entry skipped");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            stats.files_seen += 1;
            match self.select(entry.path()) {
                Ok(Some(file)) => files.push(file),
                Ok(None) => stats.files_skipped += 1,
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "unreadable file skipped");
                    stats.files_skipped += 1;
                }
            }
        }

        files.sort();
        stats.files_selected = files.len();
        stats.duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            selected = stats.files_selected,
            seen = stats.files_seen,
            "scan complete"
        );
        Ok(ScanResult {
            root: self.config.root.clone(),
            files,
            stats,
        })
    }

    /// Applies include, exclude, test-name, and size filters to one
    /// path.
    fn select(&self, path: &Path) -> Result<Option<ScannedFile>, std::io::Error> {
        let relative = path.strip_prefix(&self.config.root).unwrap_or(path);
        if !self.include.is_match(relative) {
            return Ok(None);
        }
        if !self.exclude.is_empty() && self.exclude.is_match(relative) {
            return Ok(None);
        }
        let relative_display = display_path(relative);
        if !self.config.include_tests && is_test_file(&relative_display) {
            return Ok(None);
        }
        let size = path.metadata()?.len();
        if size > self.config.max_file_size {
            debug!(path = %relative_display, size, "file exceeds size limit");
            return Ok(None);
        }
        Ok(Some(ScannedFile {
            path: relative_display,
            abs_path: path.to_path_buf(),
            size,
        }))
    }
}

/// True for file names ending in `Test.java`.
pub fn is_test_file(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    TEST_FILE.is_match(name)
}

fn display_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::Pattern {
        pattern: patterns.join(","),
        source,
    })
}
