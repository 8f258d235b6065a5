//! Flat export records, one row per logging call.
//!
//! Field order is fixed so downstream tabular consumers can rely on
//! column positions. Log rows join with `;;;` because the message
//! texts themselves regularly contain commas; catch summary rows are
//! plain comma-separated.

use std::io;

use serde::Serialize;

use crate::ast::{ExprId, SourceUnit};
use crate::attribution::{AttributionTier, ExceptionAttribution};
use crate::context::ContextMetrics;
use crate::errors::ExportError;
use crate::logcall::LogLevel;
use crate::message::LogMessage;
use crate::summary::CatchSummary;
use crate::types::{ExceptionCategory, Provenance};

/// Field separator of log record rows.
pub const LOG_RECORD_SEPARATOR: &str = ";;;";

const LOG_FIELDS: [&str; 28] = [
    "logLocation",
    "logLevel",
    "textLiteral",
    "textWithNames",
    "textWithTypes",
    "stackTraceLogged",
    "caughtExceptionTypes",
    "exceptionCategory",
    "exceptionProvenance",
    "attributedMethods",
    "attributionProvenance",
    "attributionTier",
    "catchInLoop",
    "logInInnerLoop",
    "logInInnerBranch",
    "logInInnerTry",
    "callsBeforeLog",
    "callsAfterLog",
    "linesBeforeLog",
    "linesAfterLog",
    "throwsInCatch",
    "returnsInCatch",
    "throwsInTry",
    "returnsInTry",
    "callsInTry",
    "callsInMethod",
    "methodLines",
    "fileLines",
];

/// Complete analysis output for one logging call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub log_location: String,
    pub log_level: LogLevel,
    pub text_literal: String,
    pub text_with_names: String,
    pub text_with_types: String,
    pub stack_trace_logged: bool,
    pub caught_exception_types: Vec<String>,
    pub exception_category: ExceptionCategory,
    pub exception_provenance: Provenance,
    pub attributed_methods: Vec<String>,
    pub attribution_provenance: Provenance,
    pub attribution_tier: AttributionTier,
    #[serde(flatten)]
    pub context: ContextMetrics,
}

impl LogRecord {
    pub fn from_parts(
        unit: &SourceUnit,
        call: ExprId,
        level: LogLevel,
        message: LogMessage,
        stack_trace_logged: bool,
        attribution: ExceptionAttribution,
        context: ContextMetrics,
    ) -> Self {
        Self {
            log_location: unit.location(unit.expr(call).span().start),
            log_level: level,
            text_literal: message.literal,
            text_with_names: message.with_names,
            text_with_types: message.with_types,
            stack_trace_logged,
            caught_exception_types: attribution.caught_types,
            exception_category: attribution.category,
            exception_provenance: attribution.exception_provenance,
            attributed_methods: attribution.sources.iter().map(|s| s.name.clone()).collect(),
            attribution_provenance: attribution.source_provenance,
            attribution_tier: attribution.tier,
            context,
        }
    }

    /// Column names in row order.
    pub fn header() -> String {
        LOG_FIELDS.join(LOG_RECORD_SEPARATOR)
    }

    pub fn to_row(&self) -> String {
        let c = &self.context;
        let fields: [String; 28] = [
            sanitize_field(&self.log_location),
            self.log_level.name().to_string(),
            sanitize_field(&self.text_literal),
            sanitize_field(&self.text_with_names),
            sanitize_field(&self.text_with_types),
            self.stack_trace_logged.to_string(),
            sanitize_field(&self.caught_exception_types.join(" ")),
            self.exception_category.name().to_string(),
            self.exception_provenance.name().to_string(),
            sanitize_field(&self.attributed_methods.join(" ")),
            self.attribution_provenance.name().to_string(),
            self.attribution_tier.name().to_string(),
            c.catch_in_loop.to_string(),
            c.log_in_inner_loop.to_string(),
            c.log_in_inner_branch.to_string(),
            c.log_in_inner_try.to_string(),
            c.calls_before_log.to_string(),
            c.calls_after_log.to_string(),
            c.lines_before_log.to_string(),
            c.lines_after_log.to_string(),
            c.throws_in_catch.to_string(),
            c.returns_in_catch.to_string(),
            c.throws_in_try.to_string(),
            c.returns_in_try.to_string(),
            c.calls_in_try.to_string(),
            c.calls_in_method.to_string(),
            c.method_lines.to_string(),
            c.file_lines.to_string(),
        ];
        fields.join(LOG_RECORD_SEPARATOR)
    }
}

/// Replaces line breaks with single spaces so every record stays on
/// one output line.
pub fn sanitize_field(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Writes the log record table, header first.
pub fn write_log_records<W: io::Write>(mut out: W, records: &[LogRecord]) -> Result<(), ExportError> {
    writeln!(out, "{}", LogRecord::header())?;
    for record in records {
        writeln!(out, "{}", record.to_row())?;
    }
    Ok(())
}

/// Writes the catch summary table, header first.
pub fn write_catch_summaries<W: io::Write>(
    mut out: W,
    summaries: &[CatchSummary],
) -> Result<(), ExportError> {
    writeln!(out, "{}", CatchSummary::header())?;
    for summary in summaries {
        writeln!(out, "{}", summary.to_row())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_all_columns_in_order() {
        let header = LogRecord::header();
        let columns: Vec<&str> = header.split(LOG_RECORD_SEPARATOR).collect();
        assert_eq!(columns.len(), 28);
        assert_eq!(columns[0], "logLocation");
        assert_eq!(columns[5], "stackTraceLogged");
        assert_eq!(columns[11], "attributionTier");
        assert_eq!(columns[27], "fileLines");
    }

    #[test]
    fn sanitize_collapses_line_breaks_to_single_spaces() {
        assert_eq!(sanitize_field("a\r\nb"), "a b");
        assert_eq!(sanitize_field("a\nb\rc"), "a b c");
        assert_eq!(sanitize_field("plain"), "plain");
    }
}
