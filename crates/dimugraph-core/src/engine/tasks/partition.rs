use crate::core::models::graph::EventGraph;
use crate::core::models::ids::NodeKind;
use crate::core::models::split::{Split, SplitMask, SplitMasks};
use crate::engine::config::SplitConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

/// Randomly assigns every node to the train, validation, or test split.
///
/// Assignment is per node, not per event, so the two muons of one event can
/// land in different splits. Split sizes are the rounded fractions of each
/// node table; whatever remains is the training set. A fixed seed makes the
/// partition reproducible.
#[instrument(skip_all, name = "partition_task")]
pub fn run(
    graph: &EventGraph,
    config: &SplitConfig,
    reporter: &ProgressReporter,
) -> Result<SplitMasks, EngineError> {
    let valid = (0.0..=1.0).contains(&config.validation_fraction)
        && (0.0..=1.0).contains(&config.test_fraction)
        && config.validation_fraction + config.test_fraction <= 1.0;
    if !valid {
        return Err(EngineError::InvalidSplitFractions {
            validation: config.validation_fraction,
            test: config.test_fraction,
        });
    }

    reporter.report(Progress::PhaseStart {
        name: "Node Partition",
    });
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let muons = mask_for(graph.node_count(NodeKind::Muon), config, &mut rng);
    let jets = mask_for(graph.node_count(NodeKind::Jet), config, &mut rng);
    let masks = SplitMasks { muons, jets };

    info!(
        train = masks.muons.count(Split::Train) + masks.jets.count(Split::Train),
        val = masks.muons.count(Split::Val) + masks.jets.count(Split::Val),
        test = masks.muons.count(Split::Test) + masks.jets.count(Split::Test),
        "Node partition finished."
    );
    reporter.report(Progress::PhaseFinish);
    Ok(masks)
}

fn mask_for<R: Rng>(count: usize, config: &SplitConfig, rng: &mut R) -> SplitMask {
    let mut test = (config.test_fraction * count as f64).round() as usize;
    let mut val = (config.validation_fraction * count as f64).round() as usize;
    // Rounding both fractions can overshoot on tiny tables.
    if test > count {
        test = count;
    }
    if test + val > count {
        val = count - test;
    }

    let mut order: Vec<usize> = (0..count).collect();
    order.shuffle(rng);

    let mut assignments = vec![Split::Train; count];
    for &row in order.iter().take(test) {
        assignments[row] = Split::Test;
    }
    for &row in order.iter().skip(test).take(val) {
        assignments[row] = Split::Val;
    }
    SplitMask::new(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::features::NodeTable;
    use crate::core::models::graph::InteractionTable;
    use crate::core::models::ids::RelationKind;
    use crate::core::models::label::ClassLabel;

    fn graph(muon_rows: usize, jet_rows: usize) -> EventGraph {
        let muons = NodeTable::from_rows(
            NodeKind::Muon,
            vec!["muons.pt".to_string()],
            vec![ClassLabel::Signal; muon_rows],
            (0..muon_rows).map(|i| i as f64).collect(),
        );
        let jets = NodeTable::from_rows(
            NodeKind::Jet,
            vec!["jets.pt".to_string()],
            vec![ClassLabel::Signal; jet_rows],
            (0..jet_rows).map(|i| i as f64).collect(),
        );
        EventGraph::new(
            muons,
            jets,
            InteractionTable::new(RelationKind::MuonMuon),
            InteractionTable::new(RelationKind::MuonJet),
            InteractionTable::new(RelationKind::JetMuon),
            InteractionTable::new(RelationKind::JetJet),
        )
    }

    fn split_config(validation: f64, test: f64, seed: u64) -> SplitConfig {
        SplitConfig {
            validation_fraction: validation,
            test_fraction: test,
            seed: Some(seed),
        }
    }

    #[test]
    fn split_sizes_are_rounded_fractions_of_each_table() {
        let graph = graph(100, 40);
        let reporter = ProgressReporter::default();
        let masks = run(&graph, &split_config(0.05, 0.8, 7), &reporter).unwrap();

        assert_eq!(masks.muons.len(), 100);
        assert_eq!(masks.muons.count(Split::Test), 80);
        assert_eq!(masks.muons.count(Split::Val), 5);
        assert_eq!(masks.muons.count(Split::Train), 15);

        assert_eq!(masks.jets.len(), 40);
        assert_eq!(masks.jets.count(Split::Test), 32);
        assert_eq!(masks.jets.count(Split::Val), 2);
        assert_eq!(masks.jets.count(Split::Train), 6);
    }

    #[test]
    fn the_same_seed_reproduces_the_same_partition() {
        let graph = graph(60, 10);
        let reporter = ProgressReporter::default();
        let config = split_config(0.1, 0.5, 42);

        let first = run(&graph, &config, &reporter).unwrap();
        let second = run(&graph, &config, &reporter).unwrap();
        assert_eq!(first, second);

        let other = run(&graph, &split_config(0.1, 0.5, 43), &reporter).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn zero_fractions_leave_everything_in_training() {
        let graph = graph(12, 0);
        let reporter = ProgressReporter::default();
        let masks = run(&graph, &split_config(0.0, 0.0, 1), &reporter).unwrap();
        assert_eq!(masks.muons.count(Split::Train), 12);
        assert!(masks.jets.is_empty());
    }

    #[test]
    fn rounding_overshoot_is_absorbed_by_the_smaller_splits() {
        // round(1.5) + round(1.5) would claim four of three rows.
        let graph = graph(3, 0);
        let reporter = ProgressReporter::default();
        let masks = run(&graph, &split_config(0.5, 0.5, 5), &reporter).unwrap();
        assert_eq!(masks.muons.count(Split::Test), 2);
        assert_eq!(masks.muons.count(Split::Val), 1);
        assert_eq!(masks.muons.count(Split::Train), 0);
    }

    #[test]
    fn overfull_fractions_are_rejected() {
        let graph = graph(10, 0);
        let reporter = ProgressReporter::default();
        let err = run(&graph, &split_config(0.6, 0.6, 1), &reporter).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplitFractions { .. }));
    }
}
