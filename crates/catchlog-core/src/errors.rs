//! Error types, one enum per fallible subsystem.
//!
//! The extraction engine itself never fails: unresolved references degrade
//! to sentinel values and missing context degrades to zeroed metrics. Only
//! the filesystem-facing subsystems return errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering source files.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid file pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("source root `{0}` does not exist")]
    MissingRoot(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing a single source file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load the Java grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("`{path}`: parser produced no syntax tree")]
    NoTree { path: String },

    #[error("`{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while writing record files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Umbrella error for the end-to-end pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
