//! Language-neutral source model: arena-backed trees with parent
//! indexes and the walkers built on top of them.

mod builder;
mod node;
mod unit;

pub use builder::UnitBuilder;
pub use node::{
    ClassDecl, ClassId, Expr, ExprId, Import, MethodDecl, MethodId, Parent, Span, Stmt, StmtId,
    UnitId, VarDecl, VarId,
};
pub use unit::{LineIndex, SourceUnit};

pub(crate) use unit::push_expr_children;
