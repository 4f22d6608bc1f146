use crate::core::fields::catalog::{
    JET_MULTIPLICITY_BRANCH, MUON_MULTIPLICITY_BRANCH, PAIR_SEPARATION_BRANCH,
};
use crate::core::io::traits::EventFile;
use crate::core::models::builder::GraphBuilder;
use crate::core::models::event::EventRecord;
use crate::core::models::graph::EventGraph;
use crate::core::models::ids::NodeKind;
use crate::engine::config::AssemblyConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use tracing::{info, instrument, warn};

// A qualifying dimuon event carries exactly this many muons.
const MUONS_PER_EVENT: usize = 2;

/// Counts of what assembly saw and kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub events_read: usize,
    pub events_kept: usize,
    pub events_skipped: usize,
}

/// Builds the heterogeneous graph from every configured event source.
///
/// Events qualify by carrying exactly two muons; each qualifying event
/// contributes two muon nodes wired back to back, and, when jets are
/// enabled, one jet node per counted jet wired to both muons and to the
/// event's other jets. Every edge the event contributes carries the angular
/// separation of its muon pair. Non-qualifying events are skipped and
/// counted, never an error.
#[instrument(skip_all, name = "assemble_task")]
pub fn run<F: EventFile>(
    config: &AssemblyConfig,
    reporter: &ProgressReporter,
) -> Result<(EventGraph, AssemblyReport), EngineError> {
    info!(sources = config.sources.len(), "Starting graph assembly.");
    reporter.report(Progress::PhaseStart {
        name: "Graph Assembly",
    });

    config.fields.validate()?;

    let mut batches = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let path = source.path.to_string_lossy().to_string();
        let mut events =
            F::read_from_path(&source.path, source.label).map_err(|e| EngineError::EventSource {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if let Some(cap) = config.max_events_per_source {
            events.truncate(cap);
        }
        if events.is_empty() {
            warn!(source = %path, "Event source contributed no events.");
        }
        batches.push((path, events));
    }

    let total: usize = batches.iter().map(|(_, events)| events.len()).sum();
    reporter.report(Progress::TaskStart {
        total: total as u64,
    });

    let mut builder = GraphBuilder::new(
        config.fields.muon_fields.clone(),
        config.fields.jet_fields.clone(),
    );
    let mut report = AssemblyReport::default();

    for (path, events) in &batches {
        for (index, event) in events.iter().enumerate() {
            report.events_read += 1;
            if event.field_len(MUON_MULTIPLICITY_BRANCH) != MUONS_PER_EVENT {
                report.events_skipped += 1;
            } else {
                add_event(&mut builder, config, event, path, index)?;
                report.events_kept += 1;
            }
            reporter.report(Progress::TaskIncrement { amount: 1 });
        }
    }
    reporter.report(Progress::TaskFinish);

    let graph = builder.build();
    graph.validate()?;

    info!(
        events_read = report.events_read,
        events_kept = report.events_kept,
        events_skipped = report.events_skipped,
        muons = graph.node_count(NodeKind::Muon),
        jets = graph.node_count(NodeKind::Jet),
        edges = graph.total_edges(),
        "Graph assembly finished."
    );
    reporter.report(Progress::PhaseFinish);
    Ok((graph, report))
}

fn add_event(
    builder: &mut GraphBuilder,
    config: &AssemblyConfig,
    event: &EventRecord,
    path: &str,
    index: usize,
) -> Result<(), EngineError> {
    let pair_separation = event
        .value_at(PAIR_SEPARATION_BRANCH, 0)
        .ok_or_else(|| missing_branch(path, index, PAIR_SEPARATION_BRANCH))?;

    let mut muons = Vec::with_capacity(MUONS_PER_EVENT);
    for slot in 0..MUONS_PER_EVENT {
        let mut row = Vec::with_capacity(config.fields.muon_fields.len());
        for key in &config.fields.muon_fields {
            // Pair-level branches usually hold a single entry shared by both
            // muons; the first entry stands in when the slot is absent.
            let value = event
                .value_at_or_first(key, slot)
                .ok_or_else(|| missing_branch(path, index, key))?;
            row.push(value);
        }
        muons.push(builder.push_muon(event.label(), &row));
    }
    builder.link_muons(muons[0], muons[1], pair_separation);
    builder.link_muons(muons[1], muons[0], pair_separation);

    if config.include_jets {
        let jet_count = event
            .value_at(JET_MULTIPLICITY_BRANCH, 0)
            .ok_or_else(|| missing_branch(path, index, JET_MULTIPLICITY_BRANCH))?
            as usize;

        let mut jets = Vec::with_capacity(jet_count);
        for j in 0..jet_count {
            let mut row = Vec::with_capacity(config.fields.jet_fields.len());
            for key in &config.fields.jet_fields {
                let values = event
                    .field(key)
                    .ok_or_else(|| missing_branch(path, index, key))?;
                let value =
                    values
                        .get(j)
                        .copied()
                        .ok_or_else(|| EngineError::ShortBranch {
                            path: path.to_string(),
                            event: index,
                            branch: key.clone(),
                            index: j,
                            len: values.len(),
                        })?;
                row.push(value);
            }
            let jet = builder.push_jet(event.label(), &row);
            for &muon in &muons {
                builder.link_muon_jet(muon, jet, pair_separation);
                builder.link_jet_muon(jet, muon, pair_separation);
            }
            jets.push(jet);
        }
        for (&a, &b) in jets.iter().tuple_combinations() {
            builder.link_jets(a, b, pair_separation);
            builder.link_jets(b, a, pair_separation);
        }
    }
    Ok(())
}

fn missing_branch(path: &str, event: usize, branch: &str) -> EngineError {
    EngineError::MissingBranch {
        path: path.to_string(),
        event,
        branch: branch.to_string(),
    }
}
