//! Ordered attribution strategies.
//!
//! Each tier is a pure function over the shared context; the first one
//! to return a non-empty result decides the attribution. Order is the
//! data structure here, not control flow.

use crate::attribution::engine::{Candidate, TierCx};
use crate::attribution::types::{AttributedSource, AttributionTier};
use crate::types::{Provenance, TypeId};

type TierFn = fn(&TierCx<'_>) -> Vec<AttributedSource>;

const TIERS: &[(AttributionTier, TierFn)] = &[
    (AttributionTier::DirectThrow, tier_direct_throw),
    (AttributionTier::SingleCandidate, tier_single_candidate),
    (AttributionTier::DeclaredThrows, tier_declared_throws),
    (AttributionTier::RelaxedThrows, tier_relaxed_throws),
    (AttributionTier::Fallback, tier_fallback),
];

pub(crate) fn run_tiers(cx: &TierCx<'_>) -> (Vec<AttributedSource>, AttributionTier) {
    for &(tier, strategy) in TIERS {
        let found = strategy(cx);
        if !found.is_empty() {
            return (found, tier);
        }
    }
    (Vec::new(), AttributionTier::Unattributed)
}

/// Throw statements constructing a type the catch handles. The
/// attributed entity is the method declaration containing the throw.
fn tier_direct_throw(cx: &TierCx<'_>) -> Vec<AttributedSource> {
    let mut out = Vec::new();
    for site in cx.throws {
        let Some(ty) = site.ty else { continue };
        if !cx
            .caught
            .iter()
            .any(|&c| cx.ws.types.is_subtype_or_same(ty, c))
        {
            continue;
        }
        if cx.is_claimed(site.stmt, ty) {
            continue;
        }
        let Some(method) = site.method else { continue };
        out.push(AttributedSource {
            name: cx.unit.method(method).name.clone(),
            line: site.line,
            provenance: Provenance::Project,
        });
    }
    out
}

/// When exactly one resolvable call exists in the try block, it is
/// the source with no further type evidence needed.
fn tier_single_candidate(cx: &TierCx<'_>) -> Vec<AttributedSource> {
    let resolvable: Vec<&Candidate> = cx.candidates.iter().filter(|c| c.sig.is_some()).collect();
    let [only] = resolvable.as_slice() else {
        return Vec::new();
    };
    if cx.fully_claimed(only) {
        return Vec::new();
    }
    attribute_candidate(only).into_iter().collect()
}

/// Callees declaring a thrown type that is a subtype of (or the same
/// as) a caught type.
fn tier_declared_throws(cx: &TierCx<'_>) -> Vec<AttributedSource> {
    matching_candidates(cx, |thrown, caught| {
        cx.ws.types.is_subtype_or_same(thrown, caught)
    })
}

/// Same scan with the match reversed: a caught type narrower than the
/// declaration also counts.
fn tier_relaxed_throws(cx: &TierCx<'_>) -> Vec<AttributedSource> {
    matching_candidates(cx, |thrown, caught| {
        cx.ws.types.is_subtype_or_same(caught, thrown)
    })
}

/// Last resort: the first resolvable candidate not already spoken for
/// by earlier catches.
fn tier_fallback(cx: &TierCx<'_>) -> Vec<AttributedSource> {
    for cand in cx.candidates {
        if cand.sig.is_none() || cx.fully_claimed(cand) {
            continue;
        }
        if let Some(found) = attribute_candidate(cand) {
            return vec![found];
        }
    }
    Vec::new()
}

fn matching_candidates(
    cx: &TierCx<'_>,
    type_match: impl Fn(TypeId, TypeId) -> bool,
) -> Vec<AttributedSource> {
    let mut out = Vec::new();
    for cand in cx.candidates {
        let Some(sig) = &cand.sig else { continue };
        for &thrown in &sig.throws {
            if !cx.caught.iter().any(|&c| type_match(thrown, c)) {
                continue;
            }
            if cx.is_claimed(cand.stmt, thrown) {
                continue;
            }
            out.push(AttributedSource {
                name: sig.name.clone(),
                line: cand.line,
                provenance: sig.provenance,
            });
            break;
        }
    }
    out
}

fn attribute_candidate(cand: &Candidate) -> Option<AttributedSource> {
    let sig = cand.sig.as_ref()?;
    Some(AttributedSource {
        name: sig.name.clone(),
        line: cand.line,
        provenance: sig.provenance,
    })
}
