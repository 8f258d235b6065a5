//! End-to-end extraction: scan a project root, parse and link every
//! selected file, then mine each unit for logging records and catch
//! summaries.
//!
//! Parsing and per-unit extraction fan out across the worker pool;
//! linking stays sequential because the type graph is built once for
//! the whole workspace. Record order is deterministic: units follow
//! scan order and records follow source position within a unit.

use std::fs;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::ast::{Expr, ExprId, UnitId};
use crate::attribution::AttributionEngine;
use crate::context::ContextAnalyzer;
use crate::errors::PipelineError;
use crate::java::{self, JavaParser, ParsedSource, ProjectResolver};
use crate::logcall::{self, LogLevel};
use crate::message::MessageReconstructor;
use crate::record::LogRecord;
use crate::resolve::Resolver;
use crate::scanner::{ScanConfig, Scanner};
use crate::summary::{CatchAggregator, CatchSummary};
use crate::workspace::Workspace;

/// Tuning for one end-to-end run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub scan: ScanConfig,
    /// Worker threads; `None` leaves the choice to the runtime.
    pub threads: Option<usize>,
}

/// Counters from one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub files_scanned: usize,
    pub files_parsed: usize,
    pub parse_failures: usize,
    pub catch_sections: usize,
    pub log_calls: usize,
    pub duration_ms: u64,
}

/// Everything one run produces.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub log_records: Vec<LogRecord>,
    pub catch_summaries: Vec<CatchSummary>,
    pub stats: AnalysisStats,
}

/// Runs the whole pipeline against `options.scan.root`.
pub fn analyze_project(options: &AnalysisOptions) -> Result<AnalysisReport, PipelineError> {
    match options.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(|| run(options)),
        None => run(options),
    }
}

fn run(options: &AnalysisOptions) -> Result<AnalysisReport, PipelineError> {
    let started = Instant::now();
    let scan = Scanner::new(options.scan.clone())?.scan()?;
    let files_scanned = scan.files.len();
    info!(
        files = files_scanned,
        root = %scan.root.display(),
        "scan complete"
    );

    let parsed: Vec<ParsedSource> = scan
        .files
        .par_iter()
        .map_init(JavaParser::default, |parser, file| {
            let text = match fs::read_to_string(&file.abs_path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %file.path, error = %err, "skipping unreadable file");
                    return None;
                }
            };
            match parser.parse(file.path.as_str(), text) {
                Ok(tree) => Some(tree),
                Err(err) => {
                    warn!(path = %file.path, error = %err, "skipping unparseable file");
                    None
                }
            }
        })
        .flatten()
        .collect();
    let parse_failures = files_scanned - parsed.len();

    let (ws, resolver) = java::link_units(&parsed);
    let (log_records, catch_summaries) = extract_records(&ws, &resolver);

    let stats = AnalysisStats {
        files_scanned,
        files_parsed: ws.len(),
        parse_failures,
        catch_sections: catch_summaries.len(),
        log_calls: log_records.len(),
        duration_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        log_calls = stats.log_calls,
        catch_sections = stats.catch_sections,
        elapsed_ms = stats.duration_ms,
        "analysis complete"
    );
    Ok(AnalysisReport {
        log_records,
        catch_summaries,
        stats,
    })
}

/// Mines an already linked workspace. Units fan out across the pool;
/// output keeps unit order, then source order.
pub fn extract_records(
    ws: &Workspace,
    resolver: &ProjectResolver,
) -> (Vec<LogRecord>, Vec<CatchSummary>) {
    let unit_ids: Vec<UnitId> = ws.unit_ids().collect();
    let log_records = unit_ids
        .par_iter()
        .flat_map(|&unit_id| collect_log_records(ws, resolver, unit_id))
        .collect();
    let catch_summaries = unit_ids
        .par_iter()
        .flat_map(|&unit_id| collect_catch_summaries(ws, resolver, unit_id))
        .collect();
    (log_records, catch_summaries)
}

/// One record per logging call lexically inside a catch section.
fn collect_log_records(
    ws: &Workspace,
    resolver: &dyn Resolver,
    unit_id: UnitId,
) -> Vec<LogRecord> {
    let unit = ws.unit(unit_id);
    let reconstructor = MessageReconstructor::new(ws, resolver);
    let attribution = AttributionEngine::new(ws, resolver);
    let context = ContextAnalyzer::new(ws, resolver);

    let mut calls: Vec<(ExprId, LogLevel)> = unit
        .exprs()
        .filter_map(|(id, expr)| match expr {
            Expr::Call { callee, .. } => logcall::classify_callee(callee).map(|level| (id, level)),
            _ => None,
        })
        .collect();
    calls.sort_by_key(|&(id, _)| unit.expr(id).span().start);
    calls.retain(|&(id, _)| unit.enclosing_catch(id).is_some());

    calls
        .into_iter()
        .map(|(call, level)| {
            let message = reconstructor.reconstruct(unit_id, call);
            let stack_trace = logcall::stack_trace_logged(ws, resolver, unit_id, call);
            let attributed = attribution.attribute(unit_id, call);
            let metrics = context.analyze(unit_id, call);
            LogRecord::from_parts(unit, call, level, message, stack_trace, attributed, metrics)
        })
        .collect()
}

fn collect_catch_summaries(
    ws: &Workspace,
    resolver: &dyn Resolver,
    unit_id: UnitId,
) -> Vec<CatchSummary> {
    let unit = ws.unit(unit_id);
    let aggregator = CatchAggregator::new(ws, resolver);
    unit.catch_sections()
        .into_iter()
        .map(|catch_id| aggregator.summarize(unit_id, catch_id))
        .collect()
}
