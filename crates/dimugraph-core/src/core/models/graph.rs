use super::features::NodeTable;
use super::ids::{NodeKind, RelationKind};
use super::label::ClassLabel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from graph consistency validation.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error(
        "{relation} edge ({src} -> {dst}): source id {src} is out of range for the {kind} table of {count} nodes"
    )]
    InvalidSource {
        relation: RelationKind,
        src: u32,
        dst: u32,
        kind: NodeKind,
        count: usize,
    },
    #[error(
        "{relation} edge ({src} -> {dst}): destination id {dst} is out of range for the {kind} table of {count} nodes"
    )]
    InvalidDestination {
        relation: RelationKind,
        src: u32,
        dst: u32,
        kind: NodeKind,
        count: usize,
    },
    #[error("{relation} edge ({src} -> {dst}) has a non-finite weight")]
    NonFiniteWeight {
        relation: RelationKind,
        src: u32,
        dst: u32,
    },
}

/// A directed relation between two node ids, weighted by the angular
/// separation (dR) of the parent event's muon pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Interaction {
    pub src: u32,
    pub dst: u32,
    pub weight: f64,
}

/// All edges of one [`RelationKind`], in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTable {
    kind: RelationKind,
    edges: Vec<Interaction>,
}

impl InteractionTable {
    pub fn new(kind: RelationKind) -> Self {
        Self {
            kind,
            edges: Vec::new(),
        }
    }

    pub fn from_edges(kind: RelationKind, edges: Vec<Interaction>) -> Self {
        Self { kind, edges }
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn push(&mut self, src: u32, dst: u32, weight: f64) {
        self.edges.push(Interaction { src, dst, weight });
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[Interaction] {
        &self.edges
    }
}

/// The heterogeneous graph of one run: the union of all typed node tables
/// and all typed edge tables.
///
/// There is exactly one such graph per run, sized to fit in memory. The
/// binding invariant is that every edge's endpoints reference ids present in
/// the corresponding node table; [`EventGraph::validate`] checks it after
/// assembly and after loading a persisted dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EventGraph {
    muons: NodeTable,
    jets: NodeTable,
    muon_muon: InteractionTable,
    muon_jet: InteractionTable,
    jet_muon: InteractionTable,
    jet_jet: InteractionTable,
}

impl EventGraph {
    /// Assembles a graph from its node and edge tables.
    ///
    /// # Panics
    ///
    /// Panics if a table's kind does not match the field it is passed as;
    /// the construction paths (builder and dataset loader) create tables
    /// with the right kinds.
    pub fn new(
        muons: NodeTable,
        jets: NodeTable,
        muon_muon: InteractionTable,
        muon_jet: InteractionTable,
        jet_muon: InteractionTable,
        jet_jet: InteractionTable,
    ) -> Self {
        assert_eq!(muons.kind(), NodeKind::Muon);
        assert_eq!(jets.kind(), NodeKind::Jet);
        assert_eq!(muon_muon.kind(), RelationKind::MuonMuon);
        assert_eq!(muon_jet.kind(), RelationKind::MuonJet);
        assert_eq!(jet_muon.kind(), RelationKind::JetMuon);
        assert_eq!(jet_jet.kind(), RelationKind::JetJet);
        Self {
            muons,
            jets,
            muon_muon,
            muon_jet,
            jet_muon,
            jet_jet,
        }
    }

    pub fn muons(&self) -> &NodeTable {
        &self.muons
    }

    pub fn jets(&self) -> &NodeTable {
        &self.jets
    }

    pub fn muons_mut(&mut self) -> &mut NodeTable {
        &mut self.muons
    }

    pub fn jets_mut(&mut self) -> &mut NodeTable {
        &mut self.jets
    }

    pub fn node_table(&self, kind: NodeKind) -> &NodeTable {
        match kind {
            NodeKind::Muon => &self.muons,
            NodeKind::Jet => &self.jets,
        }
    }

    pub fn relation(&self, kind: RelationKind) -> &InteractionTable {
        match kind {
            RelationKind::MuonMuon => &self.muon_muon,
            RelationKind::MuonJet => &self.muon_jet,
            RelationKind::JetMuon => &self.jet_muon,
            RelationKind::JetJet => &self.jet_jet,
        }
    }

    /// Iterates the four typed edge tables in their canonical order.
    pub fn relations(&self) -> impl Iterator<Item = &InteractionTable> {
        RelationKind::ALL.iter().map(|&kind| self.relation(kind))
    }

    pub fn node_count(&self, kind: NodeKind) -> usize {
        self.node_table(kind).len()
    }

    pub fn total_nodes(&self) -> usize {
        self.muons.len() + self.jets.len()
    }

    pub fn total_edges(&self) -> usize {
        self.relations().map(InteractionTable::len).sum()
    }

    /// Class labels of all nodes in the stacked order used by classifier
    /// score matrices and evaluation: all muons (in id order), then all jets.
    pub fn stacked_labels(&self) -> Vec<ClassLabel> {
        let mut labels = Vec::with_capacity(self.total_nodes());
        labels.extend_from_slice(self.muons.labels());
        labels.extend_from_slice(self.jets.labels());
        labels
    }

    /// Checks that every edge endpoint references an existing node of the
    /// relation's endpoint kind and that every weight is finite.
    pub fn validate(&self) -> Result<(), GraphError> {
        for table in self.relations() {
            let relation = table.kind();
            let src_kind = relation.src_kind();
            let dst_kind = relation.dst_kind();
            let src_count = self.node_count(src_kind);
            let dst_count = self.node_count(dst_kind);

            for edge in table.edges() {
                if edge.src as usize >= src_count {
                    return Err(GraphError::InvalidSource {
                        relation,
                        src: edge.src,
                        dst: edge.dst,
                        kind: src_kind,
                        count: src_count,
                    });
                }
                if edge.dst as usize >= dst_count {
                    return Err(GraphError::InvalidDestination {
                        relation,
                        src: edge.src,
                        dst: edge.dst,
                        kind: dst_kind,
                        count: dst_count,
                    });
                }
                if !edge.weight.is_finite() {
                    return Err(GraphError::NonFiniteWeight {
                        relation,
                        src: edge.src,
                        dst: edge.dst,
                    });
                }
            }
        }
        Ok(())
    }
}
