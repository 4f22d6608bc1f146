use crate::core::io::stats::{NormalizationStats, stats_file};
use crate::core::io::tables::write_dataset;
use crate::core::io::traits::EventFile;
use crate::core::models::graph::EventGraph;
use crate::core::models::ids::NodeKind;
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::tasks;
use crate::engine::tasks::assemble::AssemblyReport;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub report: AssemblyReport,
    pub muons: usize,
    pub jets: usize,
    pub edges: usize,
}

/// Assembles the dataset from the configured event sources and writes it to
/// `output_dir` as the six member and interaction tables, plus one
/// normalization statistics file per node kind when normalization is on.
#[instrument(skip_all, name = "build_workflow")]
pub fn run<F: EventFile>(
    config: &PipelineConfig,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<BuildResult, EngineError> {
    // === Phase 1: Assemble the graph ===
    let (mut graph, report) = tasks::assemble::run::<F>(&config.assembly, reporter)?;

    // === Phase 2: Normalize node features ===
    let stats = normalize_graph(&mut graph, config.normalize, reporter);

    // === Phase 3: Persist the dataset ===
    write_dataset(&graph, output_dir)?;
    if let Some(stats) = &stats {
        for (kind, table_stats) in stats {
            table_stats.save(&output_dir.join(stats_file(*kind)))?;
        }
    }

    let result = BuildResult {
        report,
        muons: graph.node_count(NodeKind::Muon),
        jets: graph.node_count(NodeKind::Jet),
        edges: graph.total_edges(),
    };
    info!(
        output = %output_dir.display(),
        muons = result.muons,
        jets = result.jets,
        edges = result.edges,
        "Dataset build complete."
    );
    Ok(result)
}

/// Normalizes both node tables in place, returning the fitted statistics;
/// `None` when normalization is disabled.
pub(super) fn normalize_graph(
    graph: &mut EventGraph,
    normalize: bool,
    reporter: &ProgressReporter,
) -> Option<Vec<(NodeKind, NormalizationStats)>> {
    if !normalize {
        info!("Normalization disabled; features keep their raw values.");
        return None;
    }
    Some(
        [NodeKind::Muon, NodeKind::Jet]
            .map(|kind| (kind, tasks::normalize::run(graph, kind, reporter)))
            .into_iter()
            .collect(),
    )
}
