//! The linked set of analyzed units plus the shared type graph.

use crate::ast::{SourceUnit, UnitId};
use crate::types::TypeGraph;

/// Everything the analyzers read: frozen units and the type graph they
/// were interned against. Immutable after linking, safe to share across
/// worker threads.
#[derive(Debug)]
pub struct Workspace {
    units: Vec<SourceUnit>,
    pub types: TypeGraph,
}

impl Workspace {
    pub fn new(units: Vec<SourceUnit>, types: TypeGraph) -> Self {
        Self { units, types }
    }

    pub fn unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id.0 as usize]
    }

    pub fn units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.iter()
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> {
        (0..self.units.len() as u32).map(UnitId)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
