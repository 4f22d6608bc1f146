use crate::core::metrics::roc::accuracy;
use crate::core::models::graph::EventGraph;
use crate::core::models::label::ClassLabel;
use crate::core::models::split::{Split, SplitMasks};
use crate::core::net::classifier::NodeClassifier;
use crate::engine::config::TrainingConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::TrainingHistory;
use tracing::{info, instrument};

// Validation accuracy is sampled at this epoch interval.
const VALIDATION_INTERVAL: usize = 10;

/// Drives the classifier through the configured number of epochs.
///
/// Each epoch fits on the training nodes; every tenth epoch additionally
/// scores the validation nodes. A non-finite loss aborts the run.
#[instrument(skip_all, name = "train_task")]
pub fn run<C: NodeClassifier>(
    classifier: &mut C,
    graph: &EventGraph,
    masks: &SplitMasks,
    config: &TrainingConfig,
    reporter: &ProgressReporter,
) -> Result<TrainingHistory, EngineError> {
    info!(
        epochs = config.epochs,
        hidden_dim = config.hidden_dim,
        "Starting training."
    );
    reporter.report(Progress::PhaseStart { name: "Training" });
    reporter.report(Progress::TaskStart {
        total: config.epochs as u64,
    });

    let stacked_labels = graph.stacked_labels();
    let val_rows: Vec<usize> = masks
        .stacked()
        .iter()
        .enumerate()
        .filter(|&(_, &split)| split == Split::Val)
        .map(|(row, _)| row)
        .collect();

    let mut history = TrainingHistory::new();
    for epoch in 1..=config.epochs {
        let loss = classifier.fit_epoch(masks);
        if !loss.is_finite() {
            return Err(EngineError::Training {
                epoch,
                message: format!("loss became non-finite ({loss})"),
            });
        }

        let mut val_accuracy = None;
        if epoch % VALIDATION_INTERVAL == 0 && !val_rows.is_empty() {
            let predictions = classifier.scores().stacked_predictions();
            let subset_predictions: Vec<usize> =
                val_rows.iter().map(|&row| predictions[row]).collect();
            let subset_labels: Vec<ClassLabel> =
                val_rows.iter().map(|&row| stacked_labels[row]).collect();
            let acc = accuracy(&subset_predictions, &subset_labels);
            reporter.report(Progress::ValidationAccuracy {
                epoch,
                accuracy: acc,
            });
            val_accuracy = Some(acc);
        }

        history.record(epoch, loss, val_accuracy);
        reporter.report(Progress::EpochCompleted { epoch, loss });
        reporter.report(Progress::TaskIncrement { amount: 1 });
    }
    reporter.report(Progress::TaskFinish);

    info!(final_loss = history.final_loss(), "Training finished.");
    reporter.report(Progress::PhaseFinish);
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::features::NodeTable;
    use crate::core::models::graph::InteractionTable;
    use crate::core::models::ids::{NodeKind, RelationKind};
    use crate::core::models::split::SplitMask;
    use crate::core::net::classifier::RelationalGcn;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn graph() -> EventGraph {
        let muons = NodeTable::from_rows(
            NodeKind::Muon,
            vec!["muons.pt".to_string(), "muons.eta".to_string()],
            vec![
                ClassLabel::Signal,
                ClassLabel::Signal,
                ClassLabel::Background,
                ClassLabel::Background,
            ],
            vec![80.0, 1.2, 75.0, 0.9, 20.0, -0.4, 25.0, -1.1],
        );
        let jets = NodeTable::empty(NodeKind::Jet, vec!["jets.pt".to_string()]);
        let mut mm = InteractionTable::new(RelationKind::MuonMuon);
        mm.push(0, 1, 0.5);
        mm.push(1, 0, 0.5);
        mm.push(2, 3, 2.0);
        mm.push(3, 2, 2.0);
        EventGraph::new(
            muons,
            jets,
            mm,
            InteractionTable::new(RelationKind::MuonJet),
            InteractionTable::new(RelationKind::JetMuon),
            InteractionTable::new(RelationKind::JetJet),
        )
    }

    fn masks_with_val() -> SplitMasks {
        SplitMasks {
            muons: SplitMask::new(vec![
                Split::Train,
                Split::Val,
                Split::Train,
                Split::Val,
            ]),
            jets: SplitMask::new(Vec::new()),
        }
    }

    fn training_config(epochs: usize) -> TrainingConfig {
        TrainingConfig {
            epochs,
            hidden_dim: 8,
            learning_rate: 0.05,
            weight_decay: 0.0,
            seed: Some(1),
        }
    }

    #[test]
    fn every_epoch_is_recorded_and_validation_is_sampled() {
        let graph = graph();
        let masks = masks_with_val();
        let config = training_config(20);
        let mut rng = StdRng::seed_from_u64(9);
        let mut model = RelationalGcn::new(
            &graph,
            config.hidden_dim,
            config.learning_rate,
            config.weight_decay,
            &mut rng,
        );

        let reporter = ProgressReporter::default();
        let history = run(&mut model, &graph, &masks, &config, &reporter).unwrap();

        assert_eq!(history.len(), 20);
        for record in history.epochs() {
            if record.epoch % 10 == 0 {
                assert!(record.val_accuracy.is_some());
            } else {
                assert!(record.val_accuracy.is_none());
            }
        }
        let first = history.epochs()[0].loss;
        let last = history.final_loss().unwrap();
        assert!(last < first, "loss {last} did not drop below {first}");
    }

    #[test]
    fn validation_is_skipped_when_no_nodes_are_assigned_to_it() {
        let graph = graph();
        let masks = SplitMasks {
            muons: SplitMask::new(vec![Split::Train; 4]),
            jets: SplitMask::new(Vec::new()),
        };
        let config = training_config(10);
        let mut rng = StdRng::seed_from_u64(2);
        let mut model = RelationalGcn::new(&graph, 8, 0.05, 0.0, &mut rng);

        let reporter = ProgressReporter::default();
        let history = run(&mut model, &graph, &masks, &config, &reporter).unwrap();
        assert!(history.epochs().iter().all(|e| e.val_accuracy.is_none()));
    }

    #[test]
    fn progress_reports_one_completed_event_per_epoch() {
        let graph = graph();
        let masks = masks_with_val();
        let config = training_config(5);
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = RelationalGcn::new(&graph, 8, 0.05, 0.0, &mut rng);

        let epochs_seen = AtomicUsize::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if matches!(event, Progress::EpochCompleted { .. }) {
                epochs_seen.fetch_add(1, Ordering::Relaxed);
            }
        }));
        run(&mut model, &graph, &masks, &config, &reporter).unwrap();
        assert_eq!(epochs_seen.load(Ordering::Relaxed), 5);
    }
}
