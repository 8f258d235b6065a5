//! Attribution driver: gathers candidates and throw sites from the try
//! block, then runs the tier list over them.

use smallvec::SmallVec;
use tracing::debug;

use crate::ast::{Expr, ExprId, MethodId, Parent, SourceUnit, Stmt, StmtId, UnitId};
use crate::attribution::tiers::run_tiers;
use crate::attribution::types::ExceptionAttribution;
use crate::resolve::{MethodSig, Resolver};
use crate::types::{ExceptionCategory, Provenance, TypeId};
use crate::workspace::Workspace;

/// A call or constructor invocation in the try block, with whatever
/// resolution produced for it.
pub(crate) struct Candidate {
    pub expr: ExprId,
    /// Statement the expression belongs to; claiming walks start here.
    pub stmt: StmtId,
    pub line: u32,
    pub sig: Option<MethodSig>,
}

/// A throw statement in the try block.
pub(crate) struct ThrowSite {
    pub stmt: StmtId,
    /// Constructed type when the thrown expression is a resolvable
    /// constructor invocation.
    pub ty: Option<TypeId>,
    /// Method declaration the throw lives in.
    pub method: Option<MethodId>,
    pub line: u32,
}

/// Inputs shared by every attribution tier.
pub(crate) struct TierCx<'a> {
    pub ws: &'a Workspace,
    pub unit: &'a SourceUnit,
    pub caught: &'a [TypeId],
    /// Source offset of the catch being attributed; earlier catches
    /// are the ones that can claim.
    pub catch_offset: u32,
    /// The try statement owning that catch.
    pub try_stmt: StmtId,
    pub candidates: &'a [Candidate],
    pub throws: &'a [ThrowSite],
}

impl TierCx<'_> {
    /// True when a textually earlier catch already handles `thrown`
    /// for a site at `stmt`. Walking up from the site, any try whose
    /// body lexically contains it is inspected; a catch of that try
    /// claims the type iff it starts before the catch under
    /// attribution and subtype-matches. The walk ends at the try being
    /// attributed.
    pub fn is_claimed(&self, stmt: StmtId, thrown: TypeId) -> bool {
        let mut child = stmt;
        let mut cur = self.unit.stmt_parent(child);
        while let Parent::Stmt(parent) = cur {
            if let Stmt::Try { body, catches, .. } = self.unit.stmt(parent) {
                if *body == child {
                    for &clause in catches.iter() {
                        let Stmt::Catch { caught, span, .. } = self.unit.stmt(clause) else {
                            continue;
                        };
                        if span.start >= self.catch_offset {
                            continue;
                        }
                        if caught
                            .iter()
                            .any(|&ct| self.ws.types.is_subtype_or_same(thrown, ct))
                        {
                            return true;
                        }
                    }
                    if parent == self.try_stmt {
                        return false;
                    }
                }
            }
            child = parent;
            cur = self.unit.stmt_parent(parent);
        }
        false
    }

    /// True when every declared thrown type of the candidate is
    /// claimed by earlier catches. A candidate declaring nothing is
    /// never fully claimed.
    pub fn fully_claimed(&self, cand: &Candidate) -> bool {
        let Some(sig) = &cand.sig else {
            return false;
        };
        if sig.throws.is_empty() {
            return false;
        }
        sig.throws.iter().all(|&t| self.is_claimed(cand.stmt, t))
    }
}

/// Resolves which call in a try block threw the exception a catch
/// section is logging about.
pub struct AttributionEngine<'a> {
    ws: &'a Workspace,
    resolver: &'a dyn Resolver,
}

impl<'a> AttributionEngine<'a> {
    pub fn new(ws: &'a Workspace, resolver: &'a dyn Resolver) -> Self {
        Self { ws, resolver }
    }

    /// Attributes the exception handled around `log_call`. A call with
    /// no enclosing catch yields the degraded result instead of an
    /// error.
    pub fn attribute(&self, unit_id: UnitId, log_call: ExprId) -> ExceptionAttribution {
        let unit = self.ws.unit(unit_id);
        let Some((catch_id, try_id)) = unit.enclosing_catch(log_call) else {
            debug!(unit = %unit.path, "log call outside any catch section");
            return ExceptionAttribution::unattributed();
        };
        let (caught, try_body): (SmallVec<[TypeId; 2]>, StmtId) =
            match (unit.stmt(catch_id), unit.stmt(try_id)) {
                (Stmt::Catch { caught, .. }, Stmt::Try { body, .. }) => (caught.clone(), *body),
                _ => return ExceptionAttribution::unattributed(),
            };

        let caught_types = caught
            .iter()
            .map(|&t| self.ws.types.presentable(t).to_string())
            .collect();
        let (category, exception_provenance) = match caught.first() {
            Some(&t) => (self.ws.types.classify(t), self.ws.types.provenance(t)),
            None => (ExceptionCategory::General, Provenance::Unknown),
        };

        let candidates = self.collect_candidates(unit_id, try_body);
        let throws = self.collect_throws(unit_id, try_body);
        let cx = TierCx {
            ws: self.ws,
            unit,
            caught: &caught,
            catch_offset: unit.stmt(catch_id).span().start,
            try_stmt: try_id,
            candidates: &candidates,
            throws: &throws,
        };
        let (sources, tier) = run_tiers(&cx);
        let source_provenance = sources
            .first()
            .map(|s| s.provenance)
            .unwrap_or(Provenance::Unknown);

        ExceptionAttribution {
            caught_types,
            category,
            exception_provenance,
            sources,
            source_provenance,
            tier,
        }
    }

    fn collect_candidates(&self, unit_id: UnitId, body: StmtId) -> Vec<Candidate> {
        let unit = self.ws.unit(unit_id);
        unit.calls_and_news_in(body)
            .into_iter()
            .filter_map(|expr| {
                let stmt = unit.enclosing_stmt(expr)?;
                let sig = match unit.expr(expr) {
                    Expr::Call { .. } => self.resolver.resolve_callee(self.ws, unit_id, expr),
                    Expr::New { .. } => self.resolver.resolve_ctor(self.ws, unit_id, expr),
                    _ => None,
                };
                Some(Candidate {
                    expr,
                    stmt,
                    line: unit.line_of(unit.expr(expr).span().start),
                    sig,
                })
            })
            .collect()
    }

    fn collect_throws(&self, unit_id: UnitId, body: StmtId) -> Vec<ThrowSite> {
        let unit = self.ws.unit(unit_id);
        unit.throws_in(body)
            .into_iter()
            .map(|stmt| {
                let ty = match unit.stmt(stmt) {
                    Stmt::Throw { expr, .. } => match unit.expr(*expr) {
                        Expr::New { .. } => self
                            .resolver
                            .resolve_ctor(self.ws, unit_id, *expr)
                            .and_then(|sig| sig.return_type),
                        _ => None,
                    },
                    _ => None,
                };
                ThrowSite {
                    stmt,
                    ty,
                    method: unit.enclosing_method_of_stmt(stmt),
                    line: unit.line_of(unit.stmt(stmt).span().start),
                }
            })
            .collect()
    }
}
