use crate::core::io::artifacts::{ArtifactError, RunDirectory};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// One run's standing in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRanking {
    pub name: String,
    pub path: PathBuf,
    pub auroc: f64,
    pub normalized: bool,
    pub jets: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryRow<'a> {
    rank: usize,
    run: &'a str,
    auroc: f64,
    normalized: bool,
    jets: bool,
}

/// Ranks previously trained runs by their persisted ROC area, best first.
///
/// Every directory must hold the ROC area and metadata artifacts of a
/// finished run; one unreadable directory fails the whole comparison. When
/// `summary_out` is given the ranking is also written there as CSV.
#[instrument(skip_all, name = "compare_workflow")]
pub fn run<P: AsRef<Path>>(
    run_dirs: &[P],
    summary_out: Option<&Path>,
    reporter: &ProgressReporter,
) -> Result<Vec<RunRanking>, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Comparison" });
    info!(runs = run_dirs.len(), "Comparing runs by ROC area.");

    let mut rankings = Vec::with_capacity(run_dirs.len());
    for dir in run_dirs {
        let run = RunDirectory::open(dir.as_ref());
        let auroc = run.load_roc_area()?;
        let metadata = run.load_metadata()?;
        rankings.push(RunRanking {
            name: run.name(),
            path: run.root().to_path_buf(),
            auroc,
            normalized: metadata.normalized,
            jets: metadata.jets,
        });
    }
    rankings.sort_by(|a, b| b.auroc.total_cmp(&a.auroc));

    if let Some(path) = summary_out {
        write_summary(&rankings, path)?;
        info!(summary = %path.display(), "Comparison summary written.");
    }

    if let Some(best) = rankings.first() {
        info!(best = %best.name, auroc = best.auroc, "Comparison finished.");
    }
    reporter.report(Progress::PhaseFinish);
    Ok(rankings)
}

fn write_summary(rankings: &[RunRanking], path: &Path) -> Result<(), EngineError> {
    let csv_err = |e: csv::Error| ArtifactError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for (i, ranking) in rankings.iter().enumerate() {
        writer
            .serialize(SummaryRow {
                rank: i + 1,
                run: &ranking.name,
                auroc: ranking.auroc,
                normalized: ranking.normalized,
                jets: ranking.jets,
            })
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e| ArtifactError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::artifacts::RunMetadata;
    use crate::core::metrics::roc::RocCurve;
    use tempfile::tempdir;

    fn persisted_run(parent: &Path, name: &str, auroc: f64, normalized: bool) -> PathBuf {
        let run = RunDirectory::create(parent, Some(name)).unwrap();
        let curve = RocCurve {
            thresholds: vec![f64::INFINITY],
            fpr: vec![0.0],
            tpr: vec![0.0],
        };
        run.save_roc(&curve, auroc).unwrap();
        run.save_metadata(&RunMetadata {
            num_classes: 2,
            m_num_features: 7,
            j_num_features: 5,
            normalized,
            jets: false,
        })
        .unwrap();
        run.root().to_path_buf()
    }

    #[test]
    fn runs_are_ranked_best_first() {
        let parent = tempdir().unwrap();
        let dirs = vec![
            persisted_run(parent.path(), "baseline", 0.71, true),
            persisted_run(parent.path(), "with_jets", 0.88, true),
            persisted_run(parent.path(), "raw_features", 0.64, false),
        ];

        let reporter = ProgressReporter::default();
        let rankings = run(&dirs, None, &reporter).unwrap();

        let names: Vec<&str> = rankings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["with_jets", "baseline", "raw_features"]);
        assert_eq!(rankings[0].auroc, 0.88);
        assert!(!rankings[2].normalized);
    }

    #[test]
    fn a_summary_file_records_the_ranking() {
        let parent = tempdir().unwrap();
        let dirs = vec![
            persisted_run(parent.path(), "low", 0.6, false),
            persisted_run(parent.path(), "high", 0.9, true),
        ];
        let summary = parent.path().join("comparison.csv");

        let reporter = ProgressReporter::default();
        run(&dirs, Some(&summary), &reporter).unwrap();

        let text = std::fs::read_to_string(&summary).unwrap();
        assert!(text.starts_with("Rank,Run,Auroc,Normalized,Jets"));
        assert!(text.contains("1,high,0.9,true,false"));
        assert!(text.contains("2,low,0.6,false,false"));
    }

    #[test]
    fn unreadable_runs_fail_the_comparison() {
        let parent = tempdir().unwrap();
        let good = persisted_run(parent.path(), "good", 0.8, true);
        let missing = parent.path().join("never_ran");

        let reporter = ProgressReporter::default();
        assert!(run(&[good, missing], None, &reporter).is_err());
    }
}
