//! Exception type graph shared by one analysis run.
//!
//! Types are interned by canonical name; a node that could not be resolved
//! to a declaration still gets interned (with no supertype edges) so that
//! every caught type participates in classification.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Canonical names of the classification roots.
pub const THROWABLE: &str = "java.lang.Throwable";
pub const EXCEPTION: &str = "java.lang.Exception";
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
pub const ERROR: &str = "java.lang.Error";

/// Interned type handle, valid for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// Which content root declared a type or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Declared in one of the analyzed source files.
    Project,
    /// Declared by a third-party library on the modeled classpath.
    Library,
    /// Declared by the JDK surface.
    Platform,
    /// No declaration found.
    Unknown,
}

impl Provenance {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Library => "library",
            Self::Platform => "platform",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse classification of a caught exception type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionCategory {
    /// Subtype of java.lang.RuntimeException.
    Runtime,
    /// Subtype of java.lang.Error.
    Error,
    /// Checked exception under java.lang.Exception.
    Checked,
    /// Everything else, including unresolved types.
    General,
}

impl ExceptionCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Error => "error",
            Self::Checked => "checked",
            Self::General => "general",
        }
    }
}

impl fmt::Display for ExceptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One interned type.
#[derive(Debug, Clone)]
pub struct TypeNode {
    /// Canonical name; the interning key. May be a bare simple name when
    /// the declaration was never found.
    pub canonical: String,
    /// Presentable text, as a declaration site would show it.
    pub simple: String,
    /// Direct supertypes (extends + implements).
    pub supers: SmallVec<[TypeId; 2]>,
    pub provenance: Provenance,
}

/// Interner plus supertype edges for every type seen in a run.
#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    by_canonical: FxHashMap<String, TypeId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a canonical name, creating a node on first sight.
    pub fn intern(&mut self, canonical: &str, provenance: Provenance) -> TypeId {
        if let Some(&id) = self.by_canonical.get(canonical) {
            return id;
        }
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(TypeNode {
            canonical: canonical.to_string(),
            simple: simple_name(canonical).to_string(),
            supers: SmallVec::new(),
            provenance,
        });
        self.by_canonical.insert(canonical.to_string(), id);
        id
    }

    pub fn lookup(&self, canonical: &str) -> Option<TypeId> {
        self.by_canonical.get(canonical).copied()
    }

    pub fn get(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.0 as usize]
    }

    pub fn canonical(&self, id: TypeId) -> &str {
        &self.get(id).canonical
    }

    pub fn presentable(&self, id: TypeId) -> &str {
        &self.get(id).simple
    }

    pub fn provenance(&self, id: TypeId) -> Provenance {
        self.get(id).provenance
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach a direct supertype edge. Duplicate edges are dropped.
    pub fn add_super(&mut self, child: TypeId, parent: TypeId) {
        if child == parent {
            return;
        }
        let supers = &mut self.nodes[child.0 as usize].supers;
        if !supers.contains(&parent) {
            supers.push(parent);
        }
    }

    /// A later declaration can upgrade a node interned as Unknown.
    pub fn set_provenance(&mut self, id: TypeId, provenance: Provenance) {
        self.nodes[id.0 as usize].provenance = provenance;
    }

    /// Reflexive subtype test over the supertype closure.
    pub fn is_subtype_or_same(&self, child: TypeId, parent: TypeId) -> bool {
        if child == parent {
            return true;
        }
        self.is_strict_subtype(child, parent)
    }

    /// Subtype test excluding the equal case at the top level.
    pub fn is_strict_subtype(&self, child: TypeId, parent: TypeId) -> bool {
        // Iterative walk with a visited set; declared hierarchies are
        // acyclic but interned input is not trusted.
        let mut visited: SmallVec<[TypeId; 8]> = SmallVec::new();
        let mut stack: SmallVec<[TypeId; 2]> = self.get(child).supers.clone();
        while let Some(next) = stack.pop() {
            if next == parent {
                return true;
            }
            if visited.contains(&next) {
                continue;
            }
            visited.push(next);
            stack.extend(self.get(next).supers.iter().copied());
        }
        false
    }

    /// Classify by root membership, highest-priority root first.
    pub fn classify(&self, ty: TypeId) -> ExceptionCategory {
        for (root, category) in [
            (RUNTIME_EXCEPTION, ExceptionCategory::Runtime),
            (ERROR, ExceptionCategory::Error),
            (EXCEPTION, ExceptionCategory::Checked),
        ] {
            if let Some(root_id) = self.lookup(root) {
                if self.is_subtype_or_same(ty, root_id) {
                    return category;
                }
            }
        }
        ExceptionCategory::General
    }
}

/// Last dot-separated segment of the base type; generic or array suffixes
/// stay attached to it.
pub fn simple_name(canonical: &str) -> &str {
    let base_end = canonical
        .find(['<', '['])
        .unwrap_or(canonical.len());
    let start = canonical[..base_end].rfind('.').map_or(0, |dot| dot + 1);
    &canonical[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_hierarchy() -> (TypeGraph, TypeId, TypeId, TypeId, TypeId) {
        let mut g = TypeGraph::new();
        let throwable = g.intern(THROWABLE, Provenance::Platform);
        let exception = g.intern(EXCEPTION, Provenance::Platform);
        let io = g.intern("java.io.IOException", Provenance::Platform);
        let fnf = g.intern("java.io.FileNotFoundException", Provenance::Platform);
        g.add_super(exception, throwable);
        g.add_super(io, exception);
        g.add_super(fnf, io);
        (g, throwable, exception, io, fnf)
    }

    #[test]
    fn subtype_is_reflexive_and_transitive() {
        let (g, throwable, exception, io, fnf) = graph_with_hierarchy();
        assert!(g.is_subtype_or_same(io, io));
        assert!(g.is_subtype_or_same(fnf, io));
        assert!(g.is_subtype_or_same(fnf, throwable));
        assert!(!g.is_subtype_or_same(exception, fnf));
    }

    #[test]
    fn strict_subtype_excludes_equality() {
        let (g, _, _, io, fnf) = graph_with_hierarchy();
        assert!(!g.is_strict_subtype(io, io));
        assert!(g.is_strict_subtype(fnf, io));
    }

    #[test]
    fn subtype_walk_survives_cycles() {
        let mut g = TypeGraph::new();
        let a = g.intern("A", Provenance::Unknown);
        let b = g.intern("B", Provenance::Unknown);
        g.add_super(a, b);
        g.add_super(b, a);
        let c = g.intern("C", Provenance::Unknown);
        assert!(!g.is_subtype_or_same(a, c));
    }

    #[test]
    fn classification_priority() {
        let mut g = TypeGraph::new();
        let throwable = g.intern(THROWABLE, Provenance::Platform);
        let exception = g.intern(EXCEPTION, Provenance::Platform);
        let runtime = g.intern(RUNTIME_EXCEPTION, Provenance::Platform);
        let error = g.intern(ERROR, Provenance::Platform);
        g.add_super(exception, throwable);
        g.add_super(runtime, exception);
        g.add_super(error, throwable);

        let custom_runtime = g.intern("com.acme.CacheMiss", Provenance::Project);
        g.add_super(custom_runtime, runtime);
        let custom_checked = g.intern("com.acme.QuotaExceeded", Provenance::Project);
        g.add_super(custom_checked, exception);
        let unresolved = g.intern("Mystery", Provenance::Unknown);

        // RuntimeException is itself under Exception: runtime must win.
        assert_eq!(g.classify(custom_runtime), ExceptionCategory::Runtime);
        assert_eq!(g.classify(error), ExceptionCategory::Error);
        assert_eq!(g.classify(custom_checked), ExceptionCategory::Checked);
        assert_eq!(g.classify(throwable), ExceptionCategory::General);
        assert_eq!(g.classify(unresolved), ExceptionCategory::General);
    }

    #[test]
    fn simple_name_keeps_suffixes() {
        assert_eq!(simple_name("java.io.IOException"), "IOException");
        assert_eq!(simple_name("java.util.List<String>"), "List<String>");
        assert_eq!(simple_name("byte[]"), "byte[]");
        assert_eq!(simple_name("IOException"), "IOException");
    }
}
