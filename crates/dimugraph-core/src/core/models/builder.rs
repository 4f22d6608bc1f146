use super::features::NodeTable;
use super::graph::{EventGraph, InteractionTable};
use super::ids::{JetId, MuonId, NodeKind, RelationKind};
use super::label::ClassLabel;

/// Incremental constructor for an [`EventGraph`].
///
/// The builder hands out fresh dense ids as nodes are pushed, so ids assigned
/// across events are contiguous per type regardless of how many events were
/// skipped in between. Edges are recorded against the typed ids the builder
/// returned, which keeps endpoint kinds correct at compile time.
pub struct GraphBuilder {
    muon_columns: Vec<String>,
    jet_columns: Vec<String>,

    // Row-major feature values, finalized into matrices by `build`.
    muon_labels: Vec<ClassLabel>,
    muon_values: Vec<f64>,
    jet_labels: Vec<ClassLabel>,
    jet_values: Vec<f64>,

    muon_muon: InteractionTable,
    muon_jet: InteractionTable,
    jet_muon: InteractionTable,
    jet_jet: InteractionTable,
}

impl GraphBuilder {
    /// Creates a builder producing tables with the given column layouts.
    pub fn new(muon_columns: Vec<String>, jet_columns: Vec<String>) -> Self {
        Self {
            muon_columns,
            jet_columns,
            muon_labels: Vec::new(),
            muon_values: Vec::new(),
            jet_labels: Vec::new(),
            jet_values: Vec::new(),
            muon_muon: InteractionTable::new(RelationKind::MuonMuon),
            muon_jet: InteractionTable::new(RelationKind::MuonJet),
            jet_muon: InteractionTable::new(RelationKind::JetMuon),
            jet_jet: InteractionTable::new(RelationKind::JetJet),
        }
    }

    /// Number of muon nodes pushed so far (the next muon id).
    pub fn muon_count(&self) -> usize {
        self.muon_labels.len()
    }

    /// Number of jet nodes pushed so far (the next jet id).
    pub fn jet_count(&self) -> usize {
        self.jet_labels.len()
    }

    /// Adds a muon node and returns its fresh id.
    ///
    /// # Panics
    ///
    /// Panics if `features` does not match the muon column layout.
    pub fn push_muon(&mut self, label: ClassLabel, features: &[f64]) -> MuonId {
        assert_eq!(
            features.len(),
            self.muon_columns.len(),
            "muon feature row width must match the column layout"
        );
        let id = MuonId::new(self.muon_labels.len());
        self.muon_labels.push(label);
        self.muon_values.extend_from_slice(features);
        id
    }

    /// Adds a jet node and returns its fresh id.
    ///
    /// # Panics
    ///
    /// Panics if `features` does not match the jet column layout.
    pub fn push_jet(&mut self, label: ClassLabel, features: &[f64]) -> JetId {
        assert_eq!(
            features.len(),
            self.jet_columns.len(),
            "jet feature row width must match the column layout"
        );
        let id = JetId::new(self.jet_labels.len());
        self.jet_labels.push(label);
        self.jet_values.extend_from_slice(features);
        id
    }

    pub fn link_muons(&mut self, src: MuonId, dst: MuonId, weight: f64) {
        self.muon_muon.push(src.index() as u32, dst.index() as u32, weight);
    }

    pub fn link_muon_jet(&mut self, src: MuonId, dst: JetId, weight: f64) {
        self.muon_jet.push(src.index() as u32, dst.index() as u32, weight);
    }

    pub fn link_jet_muon(&mut self, src: JetId, dst: MuonId, weight: f64) {
        self.jet_muon.push(src.index() as u32, dst.index() as u32, weight);
    }

    pub fn link_jets(&mut self, src: JetId, dst: JetId, weight: f64) {
        self.jet_jet.push(src.index() as u32, dst.index() as u32, weight);
    }

    /// Finalizes the accumulated rows and edges into a graph.
    pub fn build(self) -> EventGraph {
        let muons = NodeTable::from_rows(
            NodeKind::Muon,
            self.muon_columns,
            self.muon_labels,
            self.muon_values,
        );
        let jets = NodeTable::from_rows(
            NodeKind::Jet,
            self.jet_columns,
            self.jet_labels,
            self.jet_values,
        );
        EventGraph::new(
            muons,
            jets,
            self.muon_muon,
            self.muon_jet,
            self.jet_muon,
            self.jet_jet,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn ids_are_handed_out_densely_per_type() {
        let mut builder = GraphBuilder::new(columns(&["muons.pt"]), columns(&["jets.pt"]));
        let m0 = builder.push_muon(ClassLabel::Signal, &[40.0]);
        let m1 = builder.push_muon(ClassLabel::Signal, &[38.0]);
        let j0 = builder.push_jet(ClassLabel::Signal, &[55.0]);
        let m2 = builder.push_muon(ClassLabel::Background, &[25.0]);

        assert_eq!(m0.index(), 0);
        assert_eq!(m1.index(), 1);
        assert_eq!(m2.index(), 2);
        assert_eq!(j0.index(), 0);
        assert_eq!(builder.muon_count(), 3);
        assert_eq!(builder.jet_count(), 1);
    }

    #[test]
    fn built_graphs_satisfy_the_endpoint_invariant() {
        let mut builder = GraphBuilder::new(columns(&["muons.pt"]), columns(&["jets.pt"]));
        let m0 = builder.push_muon(ClassLabel::Signal, &[40.0]);
        let m1 = builder.push_muon(ClassLabel::Signal, &[38.0]);
        let j0 = builder.push_jet(ClassLabel::Signal, &[55.0]);
        builder.link_muons(m0, m1, 0.7);
        builder.link_muons(m1, m0, 0.7);
        builder.link_muon_jet(m0, j0, 0.7);
        builder.link_jet_muon(j0, m1, 0.7);

        let graph = builder.build();
        assert!(graph.validate().is_ok());
        assert_eq!(graph.total_nodes(), 3);
        assert_eq!(graph.total_edges(), 4);
        assert_eq!(graph.muons().features()[(1, 0)], 38.0);
    }

    #[test]
    #[should_panic(expected = "muon feature row width")]
    fn feature_rows_must_match_the_column_layout() {
        let mut builder = GraphBuilder::new(columns(&["muons.pt", "muons.eta"]), Vec::new());
        builder.push_muon(ClassLabel::Signal, &[40.0]);
    }
}
