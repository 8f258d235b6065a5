//! Detection and classification of logging calls.
//!
//! A call is a logging call when its lexical call target contains
//! `log` (any case) and ends in a dot followed by one of the six
//! severity names. The shape is purely textual so that project-local
//! wrappers (`myLogger.warn`, `LogUtil.history.error`) classify the
//! same way slf4j or log4j fields do.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::ast::{Expr, ExprId, SourceUnit, UnitId};
use crate::resolve::{Decl, Resolver};
use crate::types::THROWABLE;
use crate::workspace::Workspace;

/// Severity of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

static LOG_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^.*log.*\.(trace|debug|info|warn|error|fatal)$").expect("log call pattern")
});

/// Classifies a lexical call target. `None` when it is not a logging
/// call.
pub fn classify_callee(callee: &str) -> Option<LogLevel> {
    let caps = LOG_CALL.captures(callee)?;
    LogLevel::from_suffix(caps.get(1)?.as_str())
}

/// Classifies a call expression by its call-target text.
pub fn classify_log_call(unit: &SourceUnit, expr: ExprId) -> Option<LogLevel> {
    match unit.expr(expr) {
        Expr::Call { callee, .. } => classify_callee(callee),
        _ => None,
    }
}

/// True when any direct argument of the call is a reference to a value
/// whose declared type is `java.lang.Throwable` or a subtype. Nested
/// arguments do not count, and any argument that fails to resolve is
/// skipped rather than failing the whole test.
pub fn stack_trace_logged(
    ws: &Workspace,
    resolver: &dyn Resolver,
    unit_id: UnitId,
    call: ExprId,
) -> bool {
    let unit = ws.unit(unit_id);
    let Expr::Call { args, .. } = unit.expr(call) else {
        return false;
    };
    let Some(throwable) = ws.types.lookup(THROWABLE) else {
        return false;
    };
    args.iter().any(|&arg| {
        if !matches!(unit.expr(arg), Expr::Reference { .. }) {
            return false;
        }
        let Some(Decl::Variable(sig)) = resolver.resolve_reference(ws, unit_id, arg) else {
            return false;
        };
        match sig.declared_type {
            Some(ty) => ws.types.is_subtype_or_same(ty, throwable),
            None => false,
        }
    })
}
