use crate::core::io::artifacts::{RunDirectory, RunMetadata};
use crate::core::io::stats::stats_file;
use crate::core::io::tables::write_dataset;
use crate::core::io::traits::EventFile;
use crate::core::models::ids::NodeKind;
use crate::core::models::label::ClassLabel;
use crate::core::net::classifier::RelationalGcn;
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::state::TrainingHistory;
use crate::engine::tasks;
use crate::engine::tasks::assemble::AssemblyReport;
use crate::engine::tasks::evaluate::Evaluation;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct TrainResult {
    pub run_dir: RunDirectory,
    pub report: AssemblyReport,
    pub history: TrainingHistory,
    pub evaluation: Evaluation,
}

/// Runs the complete pipeline: assemble the graph, normalize, persist the
/// dataset into a fresh run directory, partition the nodes, train the
/// classifier, and evaluate it on the test split.
///
/// The run directory is created under `runs_parent` (timestamped unless
/// `run_name` is given) and ends up holding the dataset the model saw next
/// to every artifact of the run.
#[instrument(skip_all, name = "train_workflow")]
pub fn run<F: EventFile>(
    config: &PipelineConfig,
    runs_parent: &Path,
    run_name: Option<&str>,
    reporter: &ProgressReporter,
) -> Result<TrainResult, EngineError> {
    // === Phase 1: Assemble the graph ===
    let (mut graph, report) = tasks::assemble::run::<F>(&config.assembly, reporter)?;
    if graph.node_count(NodeKind::Muon) == 0 {
        return Err(EngineError::Initialization(
            "no qualifying events were assembled from the configured sources".to_string(),
        ));
    }

    // === Phase 2: Normalize node features ===
    let stats = super::build::normalize_graph(&mut graph, config.normalize, reporter);

    // === Phase 3: Persist the dataset into a fresh run directory ===
    let run_dir = RunDirectory::create(runs_parent, run_name)?;
    info!(run = %run_dir.name(), "Created run directory.");

    let dataset_dir = run_dir.dataset_dir();
    write_dataset(&graph, &dataset_dir)?;
    if let Some(stats) = &stats {
        for (kind, table_stats) in stats {
            table_stats.save(&dataset_dir.join(stats_file(*kind)))?;
        }
    }
    run_dir.save_metadata(&RunMetadata {
        num_classes: ClassLabel::NUM_CLASSES,
        m_num_features: graph.muons().num_features(),
        j_num_features: graph.jets().num_features(),
        normalized: config.normalize,
        jets: config.assembly.include_jets,
    })?;

    // === Phase 4: Partition nodes into splits ===
    let masks = tasks::partition::run(&graph, &config.split, reporter)?;

    // === Phase 5: Train the classifier ===
    let mut rng = match config.training.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut classifier = RelationalGcn::new(
        &graph,
        config.training.hidden_dim,
        config.training.learning_rate,
        config.training.weight_decay,
        &mut rng,
    );
    let history = tasks::train::run(&mut classifier, &graph, &masks, &config.training, reporter)?;

    // === Phase 6: Evaluate and persist the artifacts ===
    let evaluation = tasks::evaluate::run(&classifier, &graph, &masks, reporter)?;
    run_dir.save_roc(&evaluation.curve, evaluation.auroc)?;
    run_dir.save_predictions(&evaluation.predictions)?;
    run_dir.save_history(history.epochs())?;
    run_dir.save_model(classifier.parameters())?;

    info!(
        run = %run_dir.name(),
        auroc = evaluation.auroc,
        accuracy = evaluation.test_accuracy,
        "Training workflow complete."
    );
    Ok(TrainResult {
        run_dir,
        report,
        history,
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::artifacts::{
        HISTORY_FILE, MODEL_FILE, PREDICTIONS_FILE, ROC_AREA_FILE, ROC_CURVE_FILE,
    };
    use crate::core::io::events::JsonlEvents;
    use crate::core::io::tables::member_file;
    use crate::engine::config::{FieldSelection, PipelineConfigBuilder};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_events(dir: &Path, name: &str, base_pt: f64, separation: f64) -> PathBuf {
        let path = dir.join(name);
        let lines: Vec<String> = (0..6)
            .map(|i| {
                format!(
                    r#"{{"muons.pt": [{}, {}], "muPairs.mass": [{}], "muPairs.dR": [{}]}}"#,
                    base_pt + i as f64,
                    base_pt - 2.0 + i as f64,
                    base_pt * 3.0,
                    separation
                )
            })
            .collect();
        std::fs::write(&path, lines.join("\n")).expect("Failed to write test event file");
        path
    }

    fn pipeline_config(signal: PathBuf, background: PathBuf) -> PipelineConfig {
        PipelineConfigBuilder::new()
            .source(signal, ClassLabel::Signal)
            .source(background, ClassLabel::Background)
            .fields(FieldSelection {
                muon_fields: vec!["muons.pt".to_string(), "muPairs.mass".to_string()],
                jet_fields: vec!["jets.pt".to_string()],
            })
            .epochs(15)
            .hidden_dim(8)
            .learning_rate(0.05)
            .split_seed(7)
            .training_seed(11)
            .build()
            .expect("Failed to build test config")
    }

    fn fixture(dir: &Path) -> PipelineConfig {
        let signal = write_events(dir, "signal.jsonl", 45.0, 0.6);
        let background = write_events(dir, "background.jsonl", 22.0, 2.1);
        pipeline_config(signal, background)
    }

    #[test]
    fn a_complete_run_persists_every_artifact() {
        let dir = TempDir::new().unwrap();
        let config = fixture(dir.path());
        let runs = dir.path().join("runs");

        let reporter = ProgressReporter::default();
        let result =
            run::<JsonlEvents>(&config, &runs, Some("smoke"), &reporter).unwrap();

        assert_eq!(result.report.events_kept, 12);
        assert_eq!(result.history.len(), 15);
        assert_eq!(result.evaluation.predictions.len(), 24);

        let root = result.run_dir.root();
        assert_eq!(result.run_dir.name(), "smoke");
        for file in [
            ROC_AREA_FILE,
            ROC_CURVE_FILE,
            PREDICTIONS_FILE,
            HISTORY_FILE,
            MODEL_FILE,
        ] {
            assert!(root.join(file).exists(), "missing artifact {file}");
        }
        let dataset = result.run_dir.dataset_dir();
        assert!(dataset.join(member_file(NodeKind::Muon)).exists());
        assert!(dataset.join(stats_file(NodeKind::Muon)).exists());

        let metadata = result.run_dir.load_metadata().unwrap();
        assert_eq!(metadata.num_classes, 2);
        assert_eq!(metadata.m_num_features, 2);
        assert!(metadata.normalized);
        assert!(!metadata.jets);
    }

    #[test]
    fn seeded_runs_reproduce_their_metrics() {
        let dir = TempDir::new().unwrap();
        let config = fixture(dir.path());
        let runs = dir.path().join("runs");
        let reporter = ProgressReporter::default();

        let first = run::<JsonlEvents>(&config, &runs, Some("a"), &reporter).unwrap();
        let second = run::<JsonlEvents>(&config, &runs, Some("b"), &reporter).unwrap();

        assert_eq!(first.evaluation.auroc, second.evaluation.auroc);
        assert_eq!(
            first.history.final_loss().unwrap(),
            second.history.final_loss().unwrap()
        );
        assert_eq!(
            first.run_dir.load_roc_area().unwrap(),
            second.run_dir.load_roc_area().unwrap()
        );
    }

    #[test]
    fn runs_without_qualifying_events_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odd.jsonl");
        std::fs::write(
            &path,
            r#"{"muons.pt": [40.0], "muPairs.mass": [125.0], "muPairs.dR": [0.7]}"#,
        )
        .unwrap();
        let config = PipelineConfigBuilder::new()
            .source(path, ClassLabel::Signal)
            .fields(FieldSelection {
                muon_fields: vec!["muons.pt".to_string()],
                jet_fields: vec!["jets.pt".to_string()],
            })
            .build()
            .unwrap();

        let reporter = ProgressReporter::default();
        let err = run::<JsonlEvents>(&config, dir.path(), None, &reporter).unwrap_err();
        assert!(matches!(err, EngineError::Initialization(_)));
    }
}
