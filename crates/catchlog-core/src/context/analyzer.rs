//! Computes positional and structural metrics around a logging call.

use tracing::debug;

use crate::ast::{push_expr_children, Expr, ExprId, Parent, SourceUnit, Stmt, StmtId, UnitId};
use crate::context::types::ContextMetrics;
use crate::resolve::Resolver;
use crate::workspace::Workspace;

pub struct ContextAnalyzer<'a> {
    ws: &'a Workspace,
    resolver: &'a dyn Resolver,
}

impl<'a> ContextAnalyzer<'a> {
    pub fn new(ws: &'a Workspace, resolver: &'a dyn Resolver) -> Self {
        Self { ws, resolver }
    }

    /// Measures the surroundings of `log_call`. Missing context zeroes
    /// the affected fields and the rest are still computed.
    pub fn analyze(&self, unit_id: UnitId, log_call: ExprId) -> ContextMetrics {
        let unit = self.ws.unit(unit_id);
        let mut m = ContextMetrics {
            file_lines: unit.line_count(),
            ..ContextMetrics::default()
        };

        if let Some(mid) = unit.enclosing_method_of_expr(log_call) {
            let method = unit.method(mid);
            let start_line = unit.line_of(method.span.start);
            let end_line = unit.line_of(method.span.end.saturating_sub(1));
            m.method_lines = end_line.saturating_sub(start_line) + 1;
            if let Some(body) = method.body {
                m.calls_in_method = unit.calls_in(body).len() as u32;
            }
        } else {
            debug!(unit = %unit.path, "log call with no enclosing method");
        }

        let Some((catch_id, try_id)) = unit.enclosing_catch(log_call) else {
            debug!(unit = %unit.path, "log call with no enclosing catch");
            return m;
        };

        m.catch_in_loop = unit
            .stmt_ancestors(catch_id)
            .iter()
            .any(|&s| matches!(unit.stmt(s), Stmt::Loop { .. }));

        let between = ancestors_between(unit, log_call, catch_id);
        m.log_in_inner_loop = between
            .iter()
            .any(|&s| matches!(unit.stmt(s), Stmt::Loop { .. }));
        m.log_in_inner_try = between
            .iter()
            .any(|&s| matches!(unit.stmt(s), Stmt::Try { .. }));
        m.log_in_inner_branch = self.branch_between(unit_id, unit, &between);

        let (catch_body, try_body) = match (unit.stmt(catch_id), unit.stmt(try_id)) {
            (Stmt::Catch { body: cb, .. }, Stmt::Try { body: tb, .. }) => (*cb, *tb),
            _ => return m,
        };

        let log_start = unit.expr(log_call).span().start;
        for call in unit.calls_in(catch_body) {
            if call == log_call {
                continue;
            }
            if unit.expr(call).span().start < log_start {
                m.calls_before_log += 1;
            } else {
                m.calls_after_log += 1;
            }
        }

        let body_span = unit.stmt(catch_body).span();
        let log_line = unit.line_of(log_start) as i64;
        m.lines_before_log = log_line - unit.line_of(body_span.start) as i64;
        m.lines_after_log = unit.line_of(body_span.end.saturating_sub(1)) as i64 - log_line;
        if m.lines_before_log < 0 || m.lines_after_log < 0 {
            debug!(
                unit = %unit.path,
                line = log_line,
                "negative line span around log call"
            );
        }

        m.throws_in_catch = unit.throws_in(catch_body).len() as u32;
        m.returns_in_catch = unit.returns_in(catch_body).len() as u32;
        m.throws_in_try = unit.throws_in(try_body).len() as u32;
        m.returns_in_try = unit.returns_in(try_body).len() as u32;
        m.calls_in_try = unit.calls_in(try_body).len() as u32;
        m
    }

    /// True when an if or switch sits between the log call and its
    /// catch. An if whose condition leads with a call on a type named
    /// `Logger` is a level guard and stays transparent; the test moves
    /// outward past it.
    fn branch_between(&self, unit_id: UnitId, unit: &SourceUnit, between: &[StmtId]) -> bool {
        for &s in between {
            match unit.stmt(s) {
                Stmt::Switch { .. } => return true,
                Stmt::If { cond, .. } => {
                    if self.is_logger_guard(unit_id, unit, *cond) {
                        continue;
                    }
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    fn is_logger_guard(&self, unit_id: UnitId, unit: &SourceUnit, cond: ExprId) -> bool {
        let Some(call) = first_call_in(unit, cond) else {
            return false;
        };
        let Some(sig) = self.resolver.resolve_callee(self.ws, unit_id, call) else {
            return false;
        };
        match sig.container {
            Some(container) => self.ws.types.presentable(container) == "Logger",
            None => false,
        }
    }
}

/// Statement ancestors from the log call up to its catch, both ends
/// excluded, innermost first.
fn ancestors_between(unit: &SourceUnit, log_call: ExprId, catch_id: StmtId) -> Vec<StmtId> {
    let mut out = Vec::new();
    let Some(mut cur) = unit.enclosing_stmt(log_call) else {
        return out;
    };
    while cur != catch_id {
        out.push(cur);
        match unit.stmt_parent(cur) {
            Parent::Stmt(p) => cur = p,
            _ => break,
        }
    }
    out
}

/// Earliest call expression by source offset within an expression
/// tree.
fn first_call_in(unit: &SourceUnit, root: ExprId) -> Option<ExprId> {
    let mut best: Option<(u32, ExprId)> = None;
    let mut stack = vec![root];
    while let Some(e) = stack.pop() {
        let node = unit.expr(e);
        if matches!(node, Expr::Call { .. }) {
            let start = node.span().start;
            if best.map_or(true, |(s, _)| start < s) {
                best = Some((start, e));
            }
        }
        push_expr_children(node, &mut stack);
    }
    best.map(|(_, e)| e)
}
