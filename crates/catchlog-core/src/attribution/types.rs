//! Result types of exception attribution.

use serde::Serialize;
use std::fmt;

use crate::types::{ExceptionCategory, Provenance};

/// Which strategy produced an attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionTier {
    /// A throw statement in the try block constructs a matching type.
    DirectThrow,
    /// Only one resolvable call exists in the try block.
    SingleCandidate,
    /// A callee declares a thrown type the catch handles.
    DeclaredThrows,
    /// A callee declares a supertype of a caught type.
    RelaxedThrows,
    /// First resolvable call, no type evidence.
    Fallback,
    #[serde(rename = "none")]
    Unattributed,
}

impl AttributionTier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DirectThrow => "direct_throw",
            Self::SingleCandidate => "single_candidate",
            Self::DeclaredThrows => "declared_throws",
            Self::RelaxedThrows => "relaxed_throws",
            Self::Fallback => "fallback",
            Self::Unattributed => "none",
        }
    }
}

impl fmt::Display for AttributionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One site believed to have thrown the handled exception.
#[derive(Debug, Clone, Serialize)]
pub struct AttributedSource {
    /// Name of the method or constructor held responsible.
    pub name: String,
    /// 1-based line of the attributed site.
    pub line: u32,
    /// Where that method is declared.
    pub provenance: Provenance,
}

/// Full attribution outcome for one logging call.
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionAttribution {
    /// Presentable names of the enclosing catch's caught types, in
    /// clause order.
    pub caught_types: Vec<String>,
    /// Category of the first caught type.
    pub category: ExceptionCategory,
    /// Provenance of the first caught type.
    pub exception_provenance: Provenance,
    /// Attributed sites in source order; empty when nothing qualified.
    pub sources: Vec<AttributedSource>,
    /// Provenance of the first attributed site.
    pub source_provenance: Provenance,
    pub tier: AttributionTier,
}

impl ExceptionAttribution {
    /// Degraded result for a log call with no usable enclosing catch.
    pub fn unattributed() -> Self {
        Self {
            caught_types: Vec::new(),
            category: ExceptionCategory::General,
            exception_provenance: Provenance::Unknown,
            sources: Vec::new(),
            source_provenance: Provenance::Unknown,
            tier: AttributionTier::Unattributed,
        }
    }
}
