use crate::core::models::features::NodeTable;
use crate::core::models::graph::{EventGraph, GraphError, Interaction, InteractionTable};
use crate::core::models::ids::{NodeKind, RelationKind};
use crate::core::models::label::ClassLabel;
use std::path::Path;
use thiserror::Error;

/// File name of a node kind's member table.
pub fn member_file(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Muon => "muon_members.csv",
        NodeKind::Jet => "jet_members.csv",
    }
}

/// File name of a relation kind's interaction table.
pub fn interaction_file(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::MuonMuon => "muon_muon_interactions.csv",
        RelationKind::MuonJet => "muon_jet_interactions.csv",
        RelationKind::JetMuon => "jet_muon_interactions.csv",
        RelationKind::JetJet => "jet_jet_interactions.csv",
    }
}

/// Errors from writing or loading the dataset tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Malformed table '{path}' on record {record}: {reason}")]
    Malformed {
        path: String,
        record: usize,
        reason: String,
    },
    #[error("Member table '{path}' must start with 'Id' and 'SigBg' columns")]
    MissingMetaColumns { path: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Writes the assembled graph as the six dataset tables under `dir`.
///
/// Member tables carry `Id,SigBg` followed by the feature columns; id `k` is
/// always written on row `k`, so the files encode the dense id invariant
/// directly. Interaction tables carry `Src,Dst,Weight`. All six files are
/// written even when jets are disabled (the jet tables then hold headers
/// only), so a dataset directory always has the same shape.
pub fn write_dataset(graph: &EventGraph, dir: &Path) -> Result<(), TableError> {
    std::fs::create_dir_all(dir).map_err(|e| TableError::Io {
        path: path_str(dir),
        source: e,
    })?;

    for kind in [NodeKind::Muon, NodeKind::Jet] {
        write_members(graph.node_table(kind), &dir.join(member_file(kind)))?;
    }
    for kind in RelationKind::ALL {
        write_interactions(graph.relation(kind), &dir.join(interaction_file(kind)))?;
    }
    Ok(())
}

/// Loads a dataset directory written by [`write_dataset`] back into a graph,
/// re-validating the endpoint invariant.
pub fn load_dataset(dir: &Path) -> Result<EventGraph, TableError> {
    let muons = load_members(NodeKind::Muon, &dir.join(member_file(NodeKind::Muon)))?;
    let jets = load_members(NodeKind::Jet, &dir.join(member_file(NodeKind::Jet)))?;

    let load_relation = |kind: RelationKind| load_interactions(kind, &dir.join(interaction_file(kind)));
    let graph = EventGraph::new(
        muons,
        jets,
        load_relation(RelationKind::MuonMuon)?,
        load_relation(RelationKind::MuonJet)?,
        load_relation(RelationKind::JetMuon)?,
        load_relation(RelationKind::JetJet)?,
    );
    graph.validate()?;
    Ok(graph)
}

fn write_members(table: &NodeTable, path: &Path) -> Result<(), TableError> {
    let csv_err = |e: csv::Error| TableError::Csv {
        path: path_str(path),
        source: e,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

    let mut header: Vec<&str> = Vec::with_capacity(2 + table.num_features());
    header.push("Id");
    header.push("SigBg");
    header.extend(table.columns().iter().map(String::as_str));
    writer.write_record(&header).map_err(csv_err)?;

    let features = table.features();
    for (row, label) in table.labels().iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        record.push(row.to_string());
        record.push(label.as_str().to_string());
        for col in 0..table.num_features() {
            record.push(features[(row, col)].to_string());
        }
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| TableError::Io {
        path: path_str(path),
        source: e,
    })
}

fn load_members(kind: NodeKind, path: &Path) -> Result<NodeTable, TableError> {
    let csv_err = |e: csv::Error| TableError::Csv {
        path: path_str(path),
        source: e,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    if headers.len() < 2 || &headers[0] != "Id" || &headers[1] != "SigBg" {
        return Err(TableError::MissingMetaColumns {
            path: path_str(path),
        });
    }
    let columns: Vec<String> = headers.iter().skip(2).map(str::to_string).collect();

    let mut labels = Vec::new();
    let mut values = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let malformed = |reason: String| TableError::Malformed {
            path: path_str(path),
            record: index,
            reason,
        };

        let id: usize = record[0]
            .parse()
            .map_err(|_| malformed(format!("invalid node id '{}'", &record[0])))?;
        if id != index {
            return Err(malformed(format!(
                "node id {id} breaks the dense zero-based ordering (expected {index})"
            )));
        }
        let label: ClassLabel = record[1]
            .parse()
            .map_err(|_| malformed(format!("unknown class '{}'", &record[1])))?;
        labels.push(label);

        for (col, field) in record.iter().skip(2).enumerate() {
            let value: f64 = field.parse().map_err(|_| {
                malformed(format!(
                    "invalid value '{}' in column '{}'",
                    field, columns[col]
                ))
            })?;
            values.push(value);
        }
    }
    Ok(NodeTable::from_rows(kind, columns, labels, values))
}

fn write_interactions(table: &InteractionTable, path: &Path) -> Result<(), TableError> {
    let csv_err = |e: csv::Error| TableError::Csv {
        path: path_str(path),
        source: e,
    };
    // Headers are written by hand so empty tables still get one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer
        .write_record(["Src", "Dst", "Weight"])
        .map_err(csv_err)?;
    for edge in table.edges() {
        writer.serialize(edge).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| TableError::Io {
        path: path_str(path),
        source: e,
    })
}

fn load_interactions(kind: RelationKind, path: &Path) -> Result<InteractionTable, TableError> {
    let csv_err = |e: csv::Error| TableError::Csv {
        path: path_str(path),
        source: e,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let mut edges = Vec::new();
    for record in reader.deserialize::<Interaction>() {
        edges.push(record.map_err(csv_err)?);
    }
    Ok(InteractionTable::from_edges(kind, edges))
}
