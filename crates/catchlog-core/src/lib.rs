//! catchlog-core: Exception-logging analysis engine for Java sources
//!
//! This crate provides the components for mining how a codebase logs
//! its caught exceptions:
//! - Scanner: Parallel file walking with glob and test-file filters
//! - Java: Tree-sitter parsing, arena lowering, and symbol resolution
//! - Log Calls: Severity classification of logging call targets
//! - Messages: Three-variant reconstruction of logged text
//! - Attribution: Tiered mapping from catch sections to throwing sites
//! - Context: Structural metrics around each logging call
//! - Summaries: Per-catch-section logging profiles
//! - Records: Flat export rows and their writers
//! - Pipeline: The end-to-end scan/parse/link/extract run

pub mod ast;
pub mod attribution;
pub mod context;
pub mod errors;
pub mod java;
pub mod logcall;
pub mod message;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod scanner;
pub mod summary;
pub mod types;
pub mod workspace;

// Re-exports for convenience
pub use attribution::{AttributedSource, AttributionEngine, AttributionTier, ExceptionAttribution};
pub use context::{ContextAnalyzer, ContextMetrics};
pub use errors::{ExportError, ParseError, PipelineError, ScanError};
pub use java::{link_units, parse_workspace, JavaParser, ParsedSource, ProjectResolver};
pub use logcall::{classify_callee, classify_log_call, stack_trace_logged, LogLevel};
pub use message::{LogMessage, MessageReconstructor};
pub use pipeline::{analyze_project, extract_records, AnalysisOptions, AnalysisReport, AnalysisStats};
pub use record::{
    sanitize_field, write_catch_summaries, write_log_records, LogRecord, LOG_RECORD_SEPARATOR,
};
pub use resolve::{Decl, MethodSig, Resolver, VarSig};
pub use scanner::{is_test_file, ScanConfig, ScanResult, ScanStats, ScannedFile, Scanner};
pub use summary::{CatchAggregator, CatchSummary};
pub use types::{ExceptionCategory, Provenance, TypeGraph, TypeId};
pub use workspace::Workspace;
