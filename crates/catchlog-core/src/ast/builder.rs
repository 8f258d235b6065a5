//! Incremental construction of a [`SourceUnit`].
//!
//! The frontend pushes nodes bottom-up; `finish` derives the parent
//! index in one pass over the arenas, after which the unit is
//! immutable.

use crate::ast::node::{
    ClassDecl, ClassId, Expr, ExprId, Import, MethodDecl, MethodId, Parent, Stmt, StmtId, UnitId,
    VarDecl, VarId,
};
use crate::ast::unit::{LineIndex, SourceUnit};

#[derive(Debug, Default)]
pub struct UnitBuilder {
    path: String,
    text: String,
    package: Option<String>,
    imports: Vec<Import>,
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    methods: Vec<MethodDecl>,
    vars: Vec<VarDecl>,
    classes: Vec<ClassDecl>,
    claimed_stmts: Vec<(StmtId, ExprId)>,
}

impl UnitBuilder {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn set_package(&mut self, package: Option<String>) {
        self.package = package;
    }

    pub fn add_import(&mut self, import: Import) {
        self.imports.push(import);
    }

    pub fn add_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn add_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn add_method(&mut self, method: MethodDecl) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(method);
        id
    }

    pub fn add_var(&mut self, var: VarDecl) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(var);
        id
    }

    pub fn add_class(&mut self, class: ClassDecl) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(class);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDecl {
        &mut self.classes[id.0 as usize]
    }

    /// Marks a statement as owned by an expression. Lambda bodies sit in
    /// expression position; claiming them keeps ancestry queries working
    /// across the boundary.
    pub fn claim_stmt(&mut self, stmt: StmtId, owner: ExprId) {
        self.claimed_stmts.push((stmt, owner));
    }

    /// Seals the unit and builds the parent index. Every node keeps the
    /// first owner that claims it; well-formed input claims each node
    /// exactly once.
    pub fn finish(self, id: UnitId) -> SourceUnit {
        let mut expr_parents = vec![Parent::Detached; self.exprs.len()];
        let mut stmt_parents = vec![Parent::Detached; self.stmts.len()];

        for (i, stmt) in self.stmts.iter().enumerate() {
            let owner = Parent::Stmt(StmtId(i as u32));
            match stmt {
                Stmt::Block { stmts, .. } => {
                    for &c in stmts {
                        stmt_parents[c.0 as usize] = owner;
                    }
                }
                Stmt::Try {
                    resources,
                    body,
                    catches,
                    finally,
                    ..
                } => {
                    stmt_parents[body.0 as usize] = owner;
                    for &c in catches {
                        stmt_parents[c.0 as usize] = owner;
                    }
                    if let Some(f) = finally {
                        stmt_parents[f.0 as usize] = owner;
                    }
                    for &v in resources {
                        if let Some(init) = self.vars[v.0 as usize].init {
                            expr_parents[init.0 as usize] = owner;
                        }
                    }
                }
                Stmt::Catch { body, .. } => {
                    stmt_parents[body.0 as usize] = owner;
                }
                Stmt::Throw { expr, .. } | Stmt::Expr { expr, .. } => {
                    expr_parents[expr.0 as usize] = owner;
                }
                Stmt::Return { expr, .. } => {
                    if let Some(e) = expr {
                        expr_parents[e.0 as usize] = owner;
                    }
                }
                Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                    ..
                } => {
                    expr_parents[cond.0 as usize] = owner;
                    stmt_parents[then_branch.0 as usize] = owner;
                    if let Some(e) = else_branch {
                        stmt_parents[e.0 as usize] = owner;
                    }
                }
                Stmt::Loop {
                    vars, header, body, ..
                } => {
                    for &v in vars {
                        if let Some(init) = self.vars[v.0 as usize].init {
                            expr_parents[init.0 as usize] = owner;
                        }
                    }
                    for &e in header {
                        expr_parents[e.0 as usize] = owner;
                    }
                    stmt_parents[body.0 as usize] = owner;
                }
                Stmt::Switch {
                    scrutinee, body, ..
                } => {
                    if let Some(e) = scrutinee {
                        expr_parents[e.0 as usize] = owner;
                    }
                    stmt_parents[body.0 as usize] = owner;
                }
                Stmt::LocalVar { vars, .. } => {
                    for &v in vars {
                        if let Some(init) = self.vars[v.0 as usize].init {
                            expr_parents[init.0 as usize] = owner;
                        }
                    }
                }
                Stmt::Other { .. } => {}
            }
        }

        for (i, expr) in self.exprs.iter().enumerate() {
            let owner = Parent::Expr(ExprId(i as u32));
            match expr {
                Expr::Literal { .. } | Expr::Reference { .. } => {}
                Expr::Call { receiver, args, .. } => {
                    if let Some(r) = receiver {
                        expr_parents[r.0 as usize] = owner;
                    }
                    for &a in args {
                        expr_parents[a.0 as usize] = owner;
                    }
                }
                Expr::New { args, .. } => {
                    for &a in args {
                        expr_parents[a.0 as usize] = owner;
                    }
                }
                Expr::Concat { operands, .. } => {
                    for &o in operands {
                        expr_parents[o.0 as usize] = owner;
                    }
                }
                Expr::Opaque { children, .. } => {
                    for &c in children {
                        expr_parents[c.0 as usize] = owner;
                    }
                }
            }
        }

        for (i, method) in self.methods.iter().enumerate() {
            if let Some(body) = method.body {
                stmt_parents[body.0 as usize] = Parent::Method(MethodId(i as u32));
            }
        }

        for &(stmt, owner) in &self.claimed_stmts {
            stmt_parents[stmt.0 as usize] = Parent::Expr(owner);
        }

        let lines = LineIndex::new(&self.text);
        SourceUnit {
            id,
            path: self.path,
            package: self.package,
            imports: self.imports,
            lines,
            text: self.text,
            exprs: self.exprs,
            stmts: self.stmts,
            methods: self.methods,
            vars: self.vars,
            classes: self.classes,
            expr_parents,
            stmt_parents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::Span;
    use smallvec::smallvec;

    fn sp(start: u32, end: u32) -> Span {
        Span::new(start, end)
    }

    #[test]
    fn parent_index_links_try_catch() {
        let mut b = UnitBuilder::new("T.java", "try { a(); } catch (E e) { b(); }");
        let a = b.add_expr(Expr::Call {
            callee: "a".into(),
            name: "a".into(),
            receiver: None,
            args: vec![],
            span: sp(6, 9),
        });
        let a_stmt = b.add_stmt(Stmt::Expr {
            expr: a,
            span: sp(6, 10),
        });
        let try_body = b.add_stmt(Stmt::Block {
            stmts: vec![a_stmt],
            span: sp(4, 12),
        });
        let bcall = b.add_expr(Expr::Call {
            callee: "b".into(),
            name: "b".into(),
            receiver: None,
            args: vec![],
            span: sp(28, 31),
        });
        let b_stmt = b.add_stmt(Stmt::Expr {
            expr: bcall,
            span: sp(28, 32),
        });
        let catch_body = b.add_stmt(Stmt::Block {
            stmts: vec![b_stmt],
            span: sp(26, 34),
        });
        let catch = b.add_stmt(Stmt::Catch {
            param: None,
            caught: smallvec![],
            body: catch_body,
            span: sp(13, 34),
        });
        let tr = b.add_stmt(Stmt::Try {
            resources: smallvec![],
            body: try_body,
            catches: smallvec![catch],
            finally: None,
            span: sp(0, 34),
        });
        let unit = b.finish(UnitId(0));

        assert_eq!(unit.stmt_parent(catch), Parent::Stmt(tr));
        assert_eq!(unit.stmt_parent(try_body), Parent::Stmt(tr));
        assert_eq!(unit.enclosing_stmt(bcall), Some(b_stmt));
        assert_eq!(unit.enclosing_catch(bcall), Some((catch, tr)));
        assert_eq!(unit.enclosing_catch(a), None);
        assert_eq!(unit.calls_in(try_body), vec![a]);
        assert_eq!(unit.catch_sections(), vec![catch]);
    }

    #[test]
    fn nested_exprs_reach_enclosing_stmt() {
        let mut b = UnitBuilder::new("T.java", "x(y(z))");
        let z = b.add_expr(Expr::Reference {
            name: "z".into(),
            span: sp(4, 5),
        });
        let y = b.add_expr(Expr::Call {
            callee: "y".into(),
            name: "y".into(),
            receiver: None,
            args: vec![z],
            span: sp(2, 6),
        });
        let x = b.add_expr(Expr::Call {
            callee: "x".into(),
            name: "x".into(),
            receiver: None,
            args: vec![y],
            span: sp(0, 7),
        });
        let stmt = b.add_stmt(Stmt::Expr {
            expr: x,
            span: sp(0, 7),
        });
        let block = b.add_stmt(Stmt::Block {
            stmts: vec![stmt],
            span: sp(0, 7),
        });
        let unit = b.finish(UnitId(0));

        assert_eq!(unit.enclosing_stmt(z), Some(stmt));
        assert_eq!(unit.calls_in(block), vec![x, y]);
    }
}
