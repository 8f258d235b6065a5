//! Resolution seam between the analyzers and a concrete symbol index.
//!
//! The analyzers never inspect symbol tables directly; they ask a
//! [`Resolver`] and degrade at the call site when it answers `None`.
//! This keeps the classification and attribution logic independent of
//! how much of the program is actually indexed.

use smallvec::SmallVec;

use crate::ast::{ExprId, UnitId};
use crate::types::{Provenance, TypeId};
use crate::workspace::Workspace;

/// A variable declaration as seen through resolution.
#[derive(Debug, Clone)]
pub struct VarSig {
    pub name: String,
    pub declared_type: Option<TypeId>,
    pub provenance: Provenance,
}

/// A method or constructor as seen through resolution. Constructors
/// carry the constructed type as `return_type` and the simple class
/// name as `name`.
#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: String,
    pub container: Option<TypeId>,
    pub return_type: Option<TypeId>,
    pub throws: SmallVec<[TypeId; 2]>,
    pub provenance: Provenance,
}

/// What a reference resolved to.
#[derive(Debug, Clone)]
pub enum Decl {
    Variable(VarSig),
    Method(MethodSig),
    Type(TypeId),
}

/// Symbol resolution capability injected into the analyzers. Every
/// query may fail; `None` is an expected answer, not an error.
pub trait Resolver {
    /// Resolves a [`crate::ast::Expr::Reference`] to its declaration.
    fn resolve_reference(&self, ws: &Workspace, unit: UnitId, expr: ExprId) -> Option<Decl>;

    /// Resolves the target of a [`crate::ast::Expr::Call`].
    fn resolve_callee(&self, ws: &Workspace, unit: UnitId, call: ExprId) -> Option<MethodSig>;

    /// Resolves the constructor behind a [`crate::ast::Expr::New`].
    fn resolve_ctor(&self, ws: &Workspace, unit: UnitId, ctor: ExprId) -> Option<MethodSig>;
}
