//! Arena node kinds for the source model.
//!
//! Nodes are closed enums addressed by small ids; the tree never stores
//! parent pointers. Anything the frontend cannot classify lowers to an
//! opaque node that still carries its span and child expressions, so
//! containment queries and call counts see through it.

use smallvec::SmallVec;

use crate::types::TypeId;

/// Byte range of a node in its unit's text. End is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Identifies one analyzed file within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

/// Owner of a node, recorded in the parent index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Expr(ExprId),
    Stmt(StmtId),
    Method(MethodId),
    /// Not reachable from any statement (field initializers and the like).
    Detached,
}

/// Expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Literal token. `value` is the decoded form when one exists
    /// (string literals lose their quotes and escapes); otherwise the
    /// raw token text is used wherever the literal renders.
    Literal { value: Option<String>, span: Span },
    /// Identifier or field access; `name` is the rightmost identifier.
    Reference { name: String, span: Span },
    /// Method invocation. `callee` is the lexical call-target text as
    /// written (receiver included), `name` the method identifier alone.
    Call {
        callee: String,
        name: String,
        receiver: Option<ExprId>,
        args: Vec<ExprId>,
        span: Span,
    },
    /// Constructor invocation.
    New {
        type_name: String,
        ty: Option<TypeId>,
        args: Vec<ExprId>,
        span: Span,
    },
    /// `+`-chain, operands in source order.
    Concat { operands: Vec<ExprId>, span: Span },
    /// Any other source shape. Renders as raw text; children keep
    /// nested expressions reachable.
    Opaque { children: Vec<ExprId>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal { span, .. }
            | Self::Reference { span, .. }
            | Self::Call { span, .. }
            | Self::New { span, .. }
            | Self::Concat { span, .. }
            | Self::Opaque { span, .. } => *span,
        }
    }
}

/// Statement node.
#[derive(Debug, Clone)]
pub enum Stmt {
    Block {
        stmts: Vec<StmtId>,
        span: Span,
    },
    Try {
        resources: SmallVec<[VarId; 1]>,
        body: StmtId,
        catches: SmallVec<[StmtId; 2]>,
        finally: Option<StmtId>,
        span: Span,
    },
    /// One catch clause; multi-catch unions are exploded into `caught`
    /// in source order.
    Catch {
        param: Option<VarId>,
        caught: SmallVec<[TypeId; 2]>,
        body: StmtId,
        span: Span,
    },
    Throw {
        expr: ExprId,
        span: Span,
    },
    Return {
        expr: Option<ExprId>,
        span: Span,
    },
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
        span: Span,
    },
    /// All four loop forms. `vars` binds loop-scoped declarations,
    /// `header` keeps condition/update/iterable expressions reachable.
    Loop {
        vars: SmallVec<[VarId; 1]>,
        header: SmallVec<[ExprId; 2]>,
        body: StmtId,
        span: Span,
    },
    Switch {
        scrutinee: Option<ExprId>,
        body: StmtId,
        span: Span,
    },
    Expr {
        expr: ExprId,
        span: Span,
    },
    LocalVar {
        vars: SmallVec<[VarId; 1]>,
        span: Span,
    },
    /// Statement with no modeled structure.
    Other {
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Self::Block { span, .. }
            | Self::Try { span, .. }
            | Self::Catch { span, .. }
            | Self::Throw { span, .. }
            | Self::Return { span, .. }
            | Self::If { span, .. }
            | Self::Loop { span, .. }
            | Self::Switch { span, .. }
            | Self::Expr { span, .. }
            | Self::LocalVar { span, .. }
            | Self::Other { span, .. } => *span,
        }
    }
}

/// Method or constructor declaration.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    /// Type that declares this method.
    pub container: Option<TypeId>,
    pub params: SmallVec<[VarId; 4]>,
    /// Declared thrown types, in clause order.
    pub throws: SmallVec<[TypeId; 2]>,
    /// Absent for constructors.
    pub return_type: Option<TypeId>,
    /// Absent for abstract and interface methods.
    pub body: Option<StmtId>,
    pub is_ctor: bool,
    pub span: Span,
}

/// Variable declaration: local, parameter, field, resource, or loop
/// binding.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub declared_type: Option<TypeId>,
    pub init: Option<ExprId>,
    pub span: Span,
}

/// Class-like declaration (class, interface, enum), used for member
/// lookup during resolution.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub ty: TypeId,
    pub outer: Option<ClassId>,
    pub fields: Vec<VarId>,
    pub methods: Vec<MethodId>,
    pub span: Span,
}

/// One import declaration of a unit.
#[derive(Debug, Clone)]
pub struct Import {
    /// Imported path without the trailing `.*` for wildcards.
    pub path: String,
    pub wildcard: bool,
}
