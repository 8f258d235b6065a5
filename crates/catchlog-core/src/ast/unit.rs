//! One analyzed source file: node arenas, a parent index built at
//! construction time, and the containment and counting queries the
//! analyzers run against it.

use crate::ast::node::{
    ClassDecl, ClassId, Expr, ExprId, Import, MethodDecl, MethodId, Parent, Span, Stmt, StmtId,
    UnitId, VarDecl, VarId,
};

/// Byte-offset to 1-based line mapping.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i as u32 + 1);
            }
        }
        Self { starts }
    }

    /// 1-based line containing the byte offset.
    pub fn line_of(&self, offset: u32) -> u32 {
        self.starts.partition_point(|&s| s <= offset) as u32
    }

    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }
}

/// A single parsed file, frozen after lowering.
#[derive(Debug)]
pub struct SourceUnit {
    pub id: UnitId,
    /// Display path, as produced by the scanner.
    pub path: String,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub(crate) text: String,
    pub(crate) lines: LineIndex,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) methods: Vec<MethodDecl>,
    pub(crate) vars: Vec<VarDecl>,
    pub(crate) classes: Vec<ClassDecl>,
    pub(crate) expr_parents: Vec<Parent>,
    pub(crate) stmt_parents: Vec<Parent>,
}

impl SourceUnit {
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    pub fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[id.0 as usize]
    }

    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.0 as usize]
    }

    pub fn class(&self, id: ClassId) -> &ClassDecl {
        &self.classes[id.0 as usize]
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDecl)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId(i as u32), c))
    }

    /// Every expression of the unit in arena order.
    pub fn exprs(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs
            .iter()
            .enumerate()
            .map(|(i, e)| (ExprId(i as u32), e))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw source text of a span. Spans come from the parser and stay
    /// on char boundaries; a malformed one yields the empty string.
    pub fn text_of(&self, span: Span) -> &str {
        self.text
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    pub fn line_of(&self, offset: u32) -> u32 {
        self.lines.line_of(offset)
    }

    pub fn line_count(&self) -> u32 {
        self.lines.line_count()
    }

    /// `path:line` for the byte offset, 1-based.
    pub fn location(&self, offset: u32) -> String {
        format!("{}:{}", self.path, self.line_of(offset))
    }

    pub fn expr_parent(&self, id: ExprId) -> Parent {
        self.expr_parents[id.0 as usize]
    }

    pub fn stmt_parent(&self, id: StmtId) -> Parent {
        self.stmt_parents[id.0 as usize]
    }

    /// All catch clauses of the unit in source order.
    pub fn catch_sections(&self) -> Vec<StmtId> {
        let mut out: Vec<StmtId> = self
            .stmts
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Stmt::Catch { .. }))
            .map(|(i, _)| StmtId(i as u32))
            .collect();
        out.sort_by_key(|&s| self.stmt(s).span().start);
        out
    }

    /// Nearest enclosing statement of an expression.
    pub fn enclosing_stmt(&self, expr: ExprId) -> Option<StmtId> {
        let mut cur = self.expr_parent(expr);
        loop {
            match cur {
                Parent::Expr(e) => cur = self.expr_parent(e),
                Parent::Stmt(s) => return Some(s),
                Parent::Method(_) | Parent::Detached => return None,
            }
        }
    }

    /// Nearest enclosing catch clause of an expression, with the try
    /// statement it belongs to. The walk crosses claimed lambda bodies,
    /// so code nested in an expression still reports its lexical catch.
    pub fn enclosing_catch(&self, expr: ExprId) -> Option<(StmtId, StmtId)> {
        let mut cur = self.enclosing_stmt(expr)?;
        loop {
            if matches!(self.stmt(cur), Stmt::Catch { .. }) {
                let parent = match self.stmt_parent(cur) {
                    Parent::Stmt(p) if matches!(self.stmt(p), Stmt::Try { .. }) => p,
                    _ => return None,
                };
                return Some((cur, parent));
            }
            match self.stmt_parent(cur) {
                Parent::Stmt(p) => cur = p,
                Parent::Expr(e) => cur = self.enclosing_stmt(e)?,
                _ => return None,
            }
        }
    }

    pub fn enclosing_method_of_stmt(&self, stmt: StmtId) -> Option<MethodId> {
        let mut cur = stmt;
        loop {
            match self.stmt_parent(cur) {
                Parent::Stmt(p) => cur = p,
                Parent::Method(m) => return Some(m),
                Parent::Expr(e) => cur = self.enclosing_stmt(e)?,
                Parent::Detached => return None,
            }
        }
    }

    pub fn enclosing_method_of_expr(&self, expr: ExprId) -> Option<MethodId> {
        self.enclosing_method_of_stmt(self.enclosing_stmt(expr)?)
    }

    /// Statement ancestors of `from`, nearest first, stopping before
    /// the method boundary. `from` itself is not included.
    pub fn stmt_ancestors(&self, from: StmtId) -> Vec<StmtId> {
        let mut out = Vec::new();
        let mut cur = from;
        while let Parent::Stmt(p) = self.stmt_parent(cur) {
            out.push(p);
            cur = p;
        }
        out
    }

    /// All statements at or below `root`, preorder.
    pub fn stmts_below(&self, root: StmtId) -> Vec<StmtId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(s) = stack.pop() {
            out.push(s);
            self.push_child_stmts(s, &mut stack);
        }
        out
    }

    /// Method call expressions lexically below `root`, ordered by
    /// source position.
    pub fn calls_in(&self, root: StmtId) -> Vec<ExprId> {
        self.collect_exprs(root, |e| matches!(e, Expr::Call { .. }))
    }

    /// Method calls and constructor invocations below `root`, ordered
    /// by source position.
    pub fn calls_and_news_in(&self, root: StmtId) -> Vec<ExprId> {
        self.collect_exprs(root, |e| matches!(e, Expr::Call { .. } | Expr::New { .. }))
    }

    /// Throw statements lexically below `root`.
    pub fn throws_in(&self, root: StmtId) -> Vec<StmtId> {
        let mut out: Vec<StmtId> = self
            .stmts_below(root)
            .into_iter()
            .filter(|&s| matches!(self.stmt(s), Stmt::Throw { .. }))
            .collect();
        out.sort_by_key(|&s| self.stmt(s).span().start);
        out
    }

    /// Return statements lexically below `root`.
    pub fn returns_in(&self, root: StmtId) -> Vec<StmtId> {
        let mut out: Vec<StmtId> = self
            .stmts_below(root)
            .into_iter()
            .filter(|&s| matches!(self.stmt(s), Stmt::Return { .. }))
            .collect();
        out.sort_by_key(|&s| self.stmt(s).span().start);
        out
    }

    fn collect_exprs(&self, root: StmtId, keep: impl Fn(&Expr) -> bool) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut expr_stack = Vec::new();
        for s in self.stmts_below(root) {
            self.push_stmt_exprs(s, &mut expr_stack);
        }
        while let Some(e) = expr_stack.pop() {
            let node = self.expr(e);
            if keep(node) {
                out.push(e);
            }
            push_expr_children(node, &mut expr_stack);
        }
        out.sort_by_key(|&e| self.expr(e).span().start);
        out
    }

    fn push_child_stmts(&self, id: StmtId, out: &mut Vec<StmtId>) {
        match self.stmt(id) {
            Stmt::Block { stmts, .. } => out.extend(stmts.iter().copied()),
            Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => {
                out.push(*body);
                out.extend(catches.iter().copied());
                if let Some(f) = finally {
                    out.push(*f);
                }
            }
            Stmt::Catch { body, .. } => out.push(*body),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                out.push(*then_branch);
                if let Some(e) = else_branch {
                    out.push(*e);
                }
            }
            Stmt::Loop { body, .. } => out.push(*body),
            Stmt::Switch { body, .. } => out.push(*body),
            Stmt::Throw { .. }
            | Stmt::Return { .. }
            | Stmt::Expr { .. }
            | Stmt::LocalVar { .. }
            | Stmt::Other { .. } => {}
        }
    }

    /// Direct expression roots of one statement, declaration
    /// initializers included.
    fn push_stmt_exprs(&self, id: StmtId, out: &mut Vec<ExprId>) {
        match self.stmt(id) {
            Stmt::Throw { expr, .. } | Stmt::Expr { expr, .. } => out.push(*expr),
            Stmt::Return { expr, .. } => out.extend(expr.iter().copied()),
            Stmt::If { cond, .. } => out.push(*cond),
            Stmt::Loop { vars, header, .. } => {
                for &v in vars {
                    out.extend(self.var(v).init.iter().copied());
                }
                out.extend(header.iter().copied());
            }
            Stmt::Switch { scrutinee, .. } => out.extend(scrutinee.iter().copied()),
            Stmt::LocalVar { vars, .. } => {
                for &v in vars {
                    out.extend(self.var(v).init.iter().copied());
                }
            }
            Stmt::Try { resources, .. } => {
                for &v in resources {
                    out.extend(self.var(v).init.iter().copied());
                }
            }
            Stmt::Block { .. } | Stmt::Catch { .. } | Stmt::Other { .. } => {}
        }
    }
}

/// Pushes nested expressions of one node onto the walk stack.
pub(crate) fn push_expr_children(expr: &Expr, out: &mut Vec<ExprId>) {
    match expr {
        Expr::Literal { .. } | Expr::Reference { .. } => {}
        Expr::Call { receiver, args, .. } => {
            out.extend(receiver.iter().copied());
            out.extend(args.iter().copied());
        }
        Expr::New { args, .. } => out.extend(args.iter().copied()),
        Expr::Concat { operands, .. } => out.extend(operands.iter().copied()),
        Expr::Opaque { children, .. } => out.extend(children.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let idx = LineIndex::new("ab\ncd\nef");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 1);
        assert_eq!(idx.line_of(3), 2);
        assert_eq!(idx.line_of(6), 3);
        assert_eq!(idx.line_count(), 3);
    }

    #[test]
    fn line_index_counts_trailing_newline() {
        let idx = LineIndex::new("ab\n");
        assert_eq!(idx.line_count(), 2);
        assert_eq!(idx.line_of(3), 2);
    }

    #[test]
    fn empty_text_has_one_line() {
        let idx = LineIndex::new("");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_of(0), 1);
    }
}
