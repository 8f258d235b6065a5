//! Metric record for structural context.

use serde::Serialize;

/// Structural measurements around one logging call. Every field is
/// zero or false when the corresponding context is missing; line
/// deltas can go negative on anomalous input and are recorded as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMetrics {
    /// The whole catch section sits inside a loop.
    pub catch_in_loop: bool,
    /// The log call is inside a loop nested in the catch body.
    pub log_in_inner_loop: bool,
    /// The log call is inside an if or switch nested in the catch
    /// body; logger-level guard ifs are transparent.
    pub log_in_inner_branch: bool,
    /// The log call is inside another try nested in the catch body.
    pub log_in_inner_try: bool,
    /// Calls in the catch body starting before the log call.
    pub calls_before_log: u32,
    /// Calls in the catch body starting after the log call.
    pub calls_after_log: u32,
    /// Lines from the catch body opening to the log call.
    pub lines_before_log: i64,
    /// Lines from the log call to the catch body close.
    pub lines_after_log: i64,
    pub throws_in_catch: u32,
    pub returns_in_catch: u32,
    pub throws_in_try: u32,
    pub returns_in_try: u32,
    pub calls_in_try: u32,
    /// Calls anywhere in the enclosing method body.
    pub calls_in_method: u32,
    pub method_lines: u32,
    pub file_lines: u32,
}
