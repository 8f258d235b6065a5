//! Java front end: parsing, arena lowering, and symbol resolution.

mod lower;
mod parser;
mod platform;
mod resolver;

pub use parser::{JavaParser, ParsedSource};
pub use resolver::ProjectResolver;

use crate::ast::UnitId;
use crate::errors::ParseError;
use crate::java::lower::{lower_unit, register_unit, resolve_type_name, Registration};
use crate::java::platform::seed_type_graph;
use crate::types::TypeGraph;
use crate::workspace::Workspace;

/// Links parsed sources into a workspace and its resolver.
///
/// Every unit registers its declared types before any supertype edge
/// is attached, so declaration order across files never matters.
pub fn link_units(parsed: &[ParsedSource]) -> (Workspace, ProjectResolver) {
    let mut graph = TypeGraph::new();
    let seeds = seed_type_graph(&mut graph);
    let registrations: Vec<Registration> = parsed
        .iter()
        .map(|p| register_unit(p, &mut graph))
        .collect();
    for reg in &registrations {
        for pending in &reg.pending {
            for name in &pending.supers {
                let sup = resolve_type_name(name, &reg.names, &mut graph);
                graph.add_super(pending.ty, sup);
            }
        }
    }
    let units = parsed
        .iter()
        .zip(&registrations)
        .enumerate()
        .map(|(i, (p, reg))| lower_unit(p, UnitId(i as u32), &reg.names, &mut graph))
        .collect();
    let names = registrations.into_iter().map(|r| r.names).collect();
    let ws = Workspace::new(units, graph);
    let resolver = ProjectResolver::build(&ws, names, seeds);
    (ws, resolver)
}

/// Parses and links a set of in-memory sources in one step.
pub fn parse_workspace(
    sources: &[(&str, &str)],
) -> Result<(Workspace, ProjectResolver), ParseError> {
    let mut parser = JavaParser::new()?;
    let parsed = sources
        .iter()
        .map(|(path, text)| parser.parse(*path, *text))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(link_units(&parsed))
}
