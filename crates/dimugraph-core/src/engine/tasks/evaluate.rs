use crate::core::io::artifacts::PredictionRow;
use crate::core::metrics::roc::{RocCurve, accuracy, auroc, roc_curve};
use crate::core::models::graph::EventGraph;
use crate::core::models::ids::NodeKind;
use crate::core::models::label::ClassLabel;
use crate::core::models::split::{Split, SplitMasks};
use crate::core::net::classifier::NodeClassifier;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

/// Outcome of scoring a trained classifier against the held-out test nodes.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Area under the ROC curve over the test split.
    pub auroc: f64,
    /// ROC curve over the test split.
    pub curve: RocCurve,
    /// Fraction of test nodes whose predicted class matches the label.
    pub test_accuracy: f64,
    /// One row per node, across every split, in stacked node order.
    pub predictions: Vec<PredictionRow>,
}

/// Scores every node once and measures discrimination on the test split.
///
/// The metrics use only the test rows. The prediction rows cover the whole
/// graph, recording each node's score and split assignment.
#[instrument(skip_all, name = "evaluate_task")]
pub fn run<C: NodeClassifier>(
    classifier: &C,
    graph: &EventGraph,
    masks: &SplitMasks,
    reporter: &ProgressReporter,
) -> Result<Evaluation, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Evaluation" });

    let scores = classifier.scores();
    for kind in [NodeKind::Muon, NodeKind::Jet] {
        let scored = scores.class_probabilities(kind).nrows();
        let present = graph.node_count(kind);
        if scored != present {
            return Err(EngineError::Internal(format!(
                "classifier scored {scored} {kind} nodes but the graph holds {present}"
            )));
        }
    }

    let signal_scores = scores.stacked_signal_scores();
    let predicted_classes = scores.stacked_predictions();
    let labels = graph.stacked_labels();
    let splits = masks.stacked();
    if splits.len() != labels.len() {
        return Err(EngineError::Internal(format!(
            "split masks cover {} nodes but the graph holds {}",
            splits.len(),
            labels.len()
        )));
    }

    let test_rows: Vec<usize> = splits
        .iter()
        .enumerate()
        .filter(|&(_, &split)| split == Split::Test)
        .map(|(row, _)| row)
        .collect();
    if test_rows.is_empty() {
        warn!("Test split is empty; metrics fall back to their degenerate values.");
    }
    let test_scores: Vec<f64> = test_rows.iter().map(|&row| signal_scores[row]).collect();
    let test_labels: Vec<ClassLabel> = test_rows.iter().map(|&row| labels[row]).collect();
    let test_predictions: Vec<usize> = test_rows
        .iter()
        .map(|&row| predicted_classes[row])
        .collect();

    let area = auroc(&test_scores, &test_labels);
    let curve = roc_curve(&test_scores, &test_labels);
    let test_accuracy = accuracy(&test_predictions, &test_labels);

    let mut predictions = Vec::with_capacity(labels.len());
    for kind in [NodeKind::Muon, NodeKind::Jet] {
        let kind_scores = scores.signal_scores(kind);
        let mask = masks.for_kind(kind);
        let table = graph.node_table(kind);
        for row in 0..table.len() {
            let sig_bg = table.label(row).ok_or_else(|| {
                EngineError::Internal(format!("{kind} node {row} has no label"))
            })?;
            let split = mask.get(row).ok_or_else(|| {
                EngineError::Internal(format!("{kind} node {row} has no split assignment"))
            })?;
            predictions.push(PredictionRow {
                node_type: kind,
                id: row as u32,
                sig_bg,
                score: kind_scores[row],
                split,
            });
        }
    }

    info!(
        auroc = area,
        accuracy = test_accuracy,
        test_nodes = test_rows.len(),
        "Evaluation finished."
    );
    reporter.report(Progress::PhaseFinish);
    Ok(Evaluation {
        auroc: area,
        curve,
        test_accuracy,
        predictions,
    })
}
