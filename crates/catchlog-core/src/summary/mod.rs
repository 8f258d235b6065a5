//! Per-catch-section aggregates of contained logging calls, one
//! summary row per section.

use serde::Serialize;

use crate::ast::{Stmt, StmtId, UnitId};
use crate::logcall;
use crate::resolve::Resolver;
use crate::workspace::Workspace;

/// Shown when the catch parameter's type cannot be named.
pub const UNKNOWN_EXCEPTION: &str = "UnknownException";

const CATCH_FIELDS: [&str; 6] = [
    "catchLocation",
    "exceptionType",
    "isLogged",
    "isStackTraceLogged",
    "logNum",
    "stackTraceNum",
];

/// One catch section's logging profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchSummary {
    pub catch_location: String,
    /// Presentable caught type; multi-catch unions join with ` | `.
    pub exception_type: String,
    pub is_logged: bool,
    pub is_stack_trace_logged: bool,
    pub log_num: u32,
    pub stack_trace_num: u32,
}

impl CatchSummary {
    pub fn header() -> String {
        CATCH_FIELDS.join(",")
    }

    pub fn to_row(&self) -> String {
        [
            self.catch_location.clone(),
            self.exception_type.clone(),
            self.is_logged.to_string(),
            self.is_stack_trace_logged.to_string(),
            self.log_num.to_string(),
            self.stack_trace_num.to_string(),
        ]
        .join(",")
    }
}

/// Builds catch-section summaries by scanning each section's body for
/// logging calls.
pub struct CatchAggregator<'a> {
    ws: &'a Workspace,
    resolver: &'a dyn Resolver,
}

impl<'a> CatchAggregator<'a> {
    pub fn new(ws: &'a Workspace, resolver: &'a dyn Resolver) -> Self {
        Self { ws, resolver }
    }

    /// Summarizes one catch section. Counts cover all descendant
    /// calls, sections nested inside included.
    pub fn summarize(&self, unit_id: UnitId, catch_id: StmtId) -> CatchSummary {
        let unit = self.ws.unit(unit_id);
        let stmt = unit.stmt(catch_id);
        let catch_location = unit.location(stmt.span().start);
        let Stmt::Catch { caught, body, .. } = stmt else {
            return CatchSummary {
                catch_location,
                exception_type: UNKNOWN_EXCEPTION.to_string(),
                is_logged: false,
                is_stack_trace_logged: false,
                log_num: 0,
                stack_trace_num: 0,
            };
        };

        let exception_type = if caught.is_empty() {
            UNKNOWN_EXCEPTION.to_string()
        } else {
            caught
                .iter()
                .map(|&t| self.ws.types.presentable(t))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let mut log_num = 0u32;
        let mut stack_trace_num = 0u32;
        for call in unit.calls_in(*body) {
            if logcall::classify_log_call(unit, call).is_none() {
                continue;
            }
            log_num += 1;
            if logcall::stack_trace_logged(self.ws, self.resolver, unit_id, call) {
                stack_trace_num += 1;
            }
        }

        CatchSummary {
            catch_location,
            exception_type,
            is_logged: log_num > 0,
            is_stack_trace_logged: stack_trace_num > 0,
            log_num,
            stack_trace_num,
        }
    }
}
