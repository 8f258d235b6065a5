//! Symbol resolution over the lowered workspace.
//!
//! Resolution is name-and-declared-type based. References walk the
//! lexical scope chain, then the enclosing class's fields and outer
//! classes, then the unit's import surface. Calls type the receiver
//! the same way and search the receiver's class hierarchy, falling
//! back to the seeded platform index. Anything the walk cannot reach
//! answers `None` and the analyzers degrade at the call site.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ast::{Expr, ExprId, MethodId, Parent, SourceUnit, Stmt, StmtId, UnitId, VarId};
use crate::java::lower::{lookup_type_name, UnitNames};
use crate::java::platform::SeedMethodIndex;
use crate::resolve::{Decl, MethodSig, Resolver, VarSig};
use crate::types::{Provenance, TypeId};
use crate::workspace::Workspace;

/// Where one class keeps its members.
#[derive(Debug)]
struct ClassMembers {
    unit: UnitId,
    outer: Option<TypeId>,
    fields: Vec<VarId>,
    methods: Vec<MethodId>,
}

/// [`Resolver`] backed by the project's own declarations plus the
/// seeded platform surface.
#[derive(Debug)]
pub struct ProjectResolver {
    members: FxHashMap<TypeId, ClassMembers>,
    unit_names: Vec<UnitNames>,
    seeds: SeedMethodIndex,
}

impl ProjectResolver {
    pub(crate) fn build(ws: &Workspace, unit_names: Vec<UnitNames>, seeds: SeedMethodIndex) -> Self {
        let mut members = FxHashMap::default();
        for (unit_id, unit) in ws.unit_ids().zip(ws.units()) {
            for (_, class) in unit.classes() {
                members.insert(
                    class.ty,
                    ClassMembers {
                        unit: unit_id,
                        outer: class.outer.map(|c| unit.class(c).ty),
                        fields: class.fields.clone(),
                        methods: class.methods.clone(),
                    },
                );
            }
        }
        Self {
            members,
            unit_names,
            seeds,
        }
    }

    /// Nearest declaration of `name` visible from the expression,
    /// walking blocks outward to the enclosing method's parameters.
    fn lookup_local(
        &self,
        ws: &Workspace,
        unit_id: UnitId,
        expr: ExprId,
        name: &str,
    ) -> Option<VarSig> {
        let unit = ws.unit(unit_id);
        let position = unit.expr(expr).span().start;
        let mut cur = unit.enclosing_stmt(expr)?;
        if let Some(var) = own_vars_of(unit, cur, position, name) {
            return Some(var_sig(unit, var));
        }
        loop {
            match unit.stmt_parent(cur) {
                Parent::Stmt(parent) => {
                    if let Some(var) = scope_vars_of(unit, parent, cur, position, name) {
                        return Some(var_sig(unit, var));
                    }
                    cur = parent;
                }
                // lambda bodies keep resolving in the outer scope
                Parent::Expr(owner) => cur = unit.enclosing_stmt(owner)?,
                Parent::Method(method) => {
                    for &param in &unit.method(method).params {
                        if unit.var(param).name == name {
                            return Some(var_sig(unit, param));
                        }
                    }
                    return None;
                }
                Parent::Detached => return None,
            }
        }
    }

    fn lookup_field(&self, ws: &Workspace, start: TypeId, name: &str) -> Option<VarSig> {
        let mut ty = Some(start);
        while let Some(t) = ty {
            let members = self.members.get(&t)?;
            let unit = ws.unit(members.unit);
            for &field in &members.fields {
                if unit.var(field).name == name {
                    return Some(var_sig(unit, field));
                }
            }
            ty = members.outer;
        }
        None
    }

    /// Breadth-first search of the class hierarchy. A project method
    /// matching name and arity wins outright; otherwise the first
    /// name match, project or seeded, is kept as the answer.
    fn search_methods(
        &self,
        ws: &Workspace,
        start: TypeId,
        name: &str,
        arity: usize,
    ) -> Option<MethodSig> {
        let mut queue: VecDeque<TypeId> = VecDeque::new();
        let mut visited: SmallVec<[TypeId; 8]> = SmallVec::new();
        let mut fallback: Option<MethodSig> = None;
        queue.push_back(start);
        while let Some(ty) = queue.pop_front() {
            if visited.contains(&ty) {
                continue;
            }
            visited.push(ty);
            if let Some(members) = self.members.get(&ty) {
                let unit = ws.unit(members.unit);
                for &mid in &members.methods {
                    let method = unit.method(mid);
                    if method.is_ctor || method.name != name {
                        continue;
                    }
                    if method.params.len() == arity {
                        return Some(method_sig(unit, mid));
                    }
                    if fallback.is_none() {
                        fallback = Some(method_sig(unit, mid));
                    }
                }
            }
            if fallback.is_none() {
                for seed in self.seeds.methods_of(ty) {
                    if seed.name == name {
                        fallback = Some(MethodSig {
                            name: seed.name.to_string(),
                            container: Some(ty),
                            return_type: Some(seed.return_type),
                            throws: seed.throws.clone(),
                            provenance: seed.provenance,
                        });
                        break;
                    }
                }
            }
            queue.extend(ws.types.get(ty).supers.iter().copied());
        }
        fallback
    }

    fn receiver_type(&self, ws: &Workspace, unit_id: UnitId, recv: ExprId) -> Option<TypeId> {
        let unit = ws.unit(unit_id);
        match unit.expr(recv) {
            Expr::Reference { .. } => match self.resolve_reference(ws, unit_id, recv)? {
                Decl::Variable(sig) => sig.declared_type,
                Decl::Type(ty) => Some(ty),
                Decl::Method(_) => None,
            },
            Expr::Call { .. } => self.resolve_callee(ws, unit_id, recv)?.return_type,
            Expr::New { ty, .. } => *ty,
            _ => None,
        }
    }
}

impl Resolver for ProjectResolver {
    fn resolve_reference(&self, ws: &Workspace, unit_id: UnitId, expr: ExprId) -> Option<Decl> {
        let unit = ws.unit(unit_id);
        let Expr::Reference { name, .. } = unit.expr(expr) else {
            return None;
        };
        if let Some(sig) = self.lookup_local(ws, unit_id, expr, name) {
            return Some(Decl::Variable(sig));
        }
        if let Some(method) = unit.enclosing_method_of_expr(expr) {
            if let Some(container) = unit.method(method).container {
                if let Some(sig) = self.lookup_field(ws, container, name) {
                    return Some(Decl::Variable(sig));
                }
            }
        }
        let names = &self.unit_names[unit_id.0 as usize];
        lookup_type_name(name, names, &ws.types).map(Decl::Type)
    }

    fn resolve_callee(&self, ws: &Workspace, unit_id: UnitId, call: ExprId) -> Option<MethodSig> {
        let unit = ws.unit(unit_id);
        let Expr::Call {
            name,
            receiver,
            args,
            ..
        } = unit.expr(call)
        else {
            return None;
        };
        let arity = args.len();
        match receiver {
            None => {
                let method = unit.enclosing_method_of_expr(call)?;
                let mut ty = unit.method(method).container?;
                loop {
                    if let Some(sig) = self.search_methods(ws, ty, name, arity) {
                        return Some(sig);
                    }
                    ty = self.members.get(&ty).and_then(|m| m.outer)?;
                }
            }
            Some(recv) => {
                let ty = self.receiver_type(ws, unit_id, *recv)?;
                self.search_methods(ws, ty, name, arity)
            }
        }
    }

    fn resolve_ctor(&self, ws: &Workspace, unit_id: UnitId, ctor: ExprId) -> Option<MethodSig> {
        let unit = ws.unit(unit_id);
        let Expr::New { ty, args, .. } = unit.expr(ctor) else {
            return None;
        };
        let ty = (*ty)?;
        let mut throws: SmallVec<[TypeId; 2]> = SmallVec::new();
        if let Some(members) = self.members.get(&ty) {
            let decl_unit = ws.unit(members.unit);
            let ctors = || {
                members
                    .methods
                    .iter()
                    .copied()
                    .filter(|&m| decl_unit.method(m).is_ctor)
            };
            let chosen = ctors()
                .find(|&m| decl_unit.method(m).params.len() == args.len())
                .or_else(|| ctors().next());
            if let Some(mid) = chosen {
                throws = decl_unit.method(mid).throws.clone();
            }
        }
        Some(MethodSig {
            name: ws.types.presentable(ty).to_string(),
            container: Some(ty),
            return_type: Some(ty),
            throws,
            provenance: ws.types.provenance(ty),
        })
    }
}

fn var_sig(unit: &SourceUnit, var: VarId) -> VarSig {
    let decl = unit.var(var);
    VarSig {
        name: decl.name.clone(),
        declared_type: decl.declared_type,
        provenance: Provenance::Project,
    }
}

fn method_sig(unit: &SourceUnit, method: MethodId) -> MethodSig {
    let decl = unit.method(method);
    let return_type = if decl.is_ctor {
        decl.container
    } else {
        decl.return_type
    };
    MethodSig {
        name: decl.name.clone(),
        container: decl.container,
        return_type,
        throws: decl.throws.clone(),
        provenance: Provenance::Project,
    }
}

/// Declarations the statement itself introduces for its own interior,
/// loop variables and try resources.
fn own_vars_of(unit: &SourceUnit, stmt: StmtId, position: u32, name: &str) -> Option<VarId> {
    match unit.stmt(stmt) {
        Stmt::Loop { vars, .. } => vars.iter().copied().find(|&v| unit.var(v).name == name),
        Stmt::Try { resources, .. } => resources
            .iter()
            .copied()
            .find(|&v| unit.var(v).span.start < position && unit.var(v).name == name),
        _ => None,
    }
}

/// Declarations `parent` makes visible to the child statement.
fn scope_vars_of(
    unit: &SourceUnit,
    parent: StmtId,
    child: StmtId,
    position: u32,
    name: &str,
) -> Option<VarId> {
    match unit.stmt(parent) {
        Stmt::Block { stmts, .. } => {
            for &stmt in stmts {
                let Stmt::LocalVar { vars, .. } = unit.stmt(stmt) else {
                    continue;
                };
                for &var in vars {
                    if unit.var(var).span.start < position && unit.var(var).name == name {
                        return Some(var);
                    }
                }
            }
            None
        }
        Stmt::Loop { vars, .. } => vars.iter().copied().find(|&v| unit.var(v).name == name),
        Stmt::Try {
            resources, body, ..
        } => {
            if *body == child {
                resources.iter().copied().find(|&v| unit.var(v).name == name)
            } else {
                None
            }
        }
        Stmt::Catch { param, body, .. } => {
            if *body == child {
                param.filter(|&v| unit.var(v).name == name)
            } else {
                None
            }
        }
        _ => None,
    }
}
