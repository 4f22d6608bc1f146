use crate::core::io::stats::NormalizationStats;
use crate::core::models::features::NodeTable;
use crate::core::models::graph::EventGraph;
use crate::core::models::ids::NodeKind;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::DMatrix;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Columns with less spread than this are centered but not scaled.
const MIN_SDEV: f64 = 1e-10;

/// Z-scores one node table in place and returns the statistics applied.
///
/// Means and standard deviations are taken over the whole table (population
/// standard deviation), one pair per feature column, and the table's values
/// are replaced by `(x - mean) / sdev`. A column whose spread vanishes is
/// centered but not scaled, and records an sdev of one.
#[instrument(skip_all, name = "normalize_task")]
pub fn run(graph: &mut EventGraph, kind: NodeKind, reporter: &ProgressReporter) -> NormalizationStats {
    info!(kind = %kind, "Normalizing node features.");
    reporter.report(Progress::PhaseStart {
        name: "Normalization",
    });

    let table = table_mut(graph, kind);
    let rows = table.len();
    let columns = table.columns().to_vec();

    let mut stats = NormalizationStats::new();
    if rows == 0 {
        // An empty table still records one entry per column.
        for column in &columns {
            stats.insert(column.as_str(), 0.0, 1.0);
        }
        warn!(kind = %kind, "Node table is empty; nothing to normalize.");
        reporter.report(Progress::PhaseFinish);
        return stats;
    }

    let features = table.features();
    #[cfg(feature = "parallel")]
    let moments: Vec<(f64, f64)> = (0..columns.len())
        .into_par_iter()
        .map(|c| column_moments(features, c))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let moments: Vec<(f64, f64)> = (0..columns.len())
        .map(|c| column_moments(features, c))
        .collect();

    let features = table.features_mut();
    for (c, &(mean, sdev)) in moments.iter().enumerate() {
        let scale = if sdev > MIN_SDEV { sdev } else { 1.0 };
        for r in 0..rows {
            features[(r, c)] = (features[(r, c)] - mean) / scale;
        }
        stats.insert(columns[c].as_str(), mean, scale);
    }

    info!(kind = %kind, columns = columns.len(), rows, "Normalization finished.");
    reporter.report(Progress::PhaseFinish);
    stats
}

/// Reapplies previously persisted statistics to one node table.
///
/// Every feature column must have an entry in `stats`; this is how a dataset
/// assembled later is brought onto the scale an earlier run trained with.
pub fn apply(
    graph: &mut EventGraph,
    kind: NodeKind,
    stats: &NormalizationStats,
) -> Result<(), EngineError> {
    let table = table_mut(graph, kind);
    let rows = table.len();
    let columns = table.columns().to_vec();

    let mut moments = Vec::with_capacity(columns.len());
    for column in &columns {
        let entry = stats
            .get(column)
            .ok_or_else(|| EngineError::MissingStatistics {
                column: column.clone(),
            })?;
        let scale = if entry.sdev.abs() > MIN_SDEV {
            entry.sdev
        } else {
            1.0
        };
        moments.push((entry.mean, scale));
    }

    let features = table.features_mut();
    for (c, &(mean, scale)) in moments.iter().enumerate() {
        for r in 0..rows {
            features[(r, c)] = (features[(r, c)] - mean) / scale;
        }
    }
    Ok(())
}

fn table_mut(graph: &mut EventGraph, kind: NodeKind) -> &mut NodeTable {
    match kind {
        NodeKind::Muon => graph.muons_mut(),
        NodeKind::Jet => graph.jets_mut(),
    }
}

fn column_moments(features: &DMatrix<f64>, column: usize) -> (f64, f64) {
    let rows = features.nrows();
    let mean = (0..rows).map(|r| features[(r, column)]).sum::<f64>() / rows as f64;
    let variance = (0..rows)
        .map(|r| {
            let d = features[(r, column)] - mean;
            d * d
        })
        .sum::<f64>()
        / rows as f64;
    (mean, variance.sqrt())
}
