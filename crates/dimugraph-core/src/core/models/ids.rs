use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a muon node, unique within the muon table of one graph.
///
/// Ids are dense and zero-based: the muon with id `k` is row `k` of the muon
/// node table, so an id doubles as a feature-matrix row index and as the
/// integer written to the `Id` column of the member tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MuonId(u32);

/// Identifier of a jet node, unique within the jet table of one graph.
///
/// Dense and zero-based, with the same row-index correspondence as [`MuonId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JetId(u32);

impl MuonId {
    pub(crate) fn new(index: usize) -> Self {
        MuonId(index as u32)
    }

    /// Returns the id as a row index into the muon node table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl JetId {
    pub(crate) fn new(index: usize) -> Self {
        JetId(index as u32)
    }

    /// Returns the id as a row index into the jet node table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MuonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for JetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The physical object type behind a node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Muon,
    Jet,
}

impl NodeKind {
    /// Returns the lowercase name used in file names and prediction tables.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Muon => "muon",
            NodeKind::Jet => "jet",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed directed relation between two node kinds.
///
/// Each assembled graph carries one edge table per relation kind; the source
/// and destination kinds determine which node tables an edge's endpoints
/// index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    MuonMuon,
    MuonJet,
    JetMuon,
    JetJet,
}

impl RelationKind {
    /// All relation kinds, in the order their tables are written to disk.
    pub const ALL: [RelationKind; 4] = [
        RelationKind::MuonMuon,
        RelationKind::MuonJet,
        RelationKind::JetMuon,
        RelationKind::JetJet,
    ];

    /// The node kind edge sources index into.
    pub fn src_kind(self) -> NodeKind {
        match self {
            RelationKind::MuonMuon | RelationKind::MuonJet => NodeKind::Muon,
            RelationKind::JetMuon | RelationKind::JetJet => NodeKind::Jet,
        }
    }

    /// The node kind edge destinations index into.
    pub fn dst_kind(self) -> NodeKind {
        match self {
            RelationKind::MuonMuon | RelationKind::JetMuon => NodeKind::Muon,
            RelationKind::MuonJet | RelationKind::JetJet => NodeKind::Jet,
        }
    }

    /// Returns the snake_case relation name used in table file names.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::MuonMuon => "muon_muon",
            RelationKind::MuonJet => "muon_jet",
            RelationKind::JetMuon => "jet_muon",
            RelationKind::JetJet => "jet_jet",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_row_indices() {
        assert_eq!(MuonId::new(0).index(), 0);
        assert_eq!(MuonId::new(41).index(), 41);
        assert_eq!(JetId::new(7).index(), 7);
        assert_eq!(MuonId::new(3).to_string(), "3");
    }

    #[test]
    fn relation_kinds_know_their_endpoint_kinds() {
        assert_eq!(RelationKind::MuonMuon.src_kind(), NodeKind::Muon);
        assert_eq!(RelationKind::MuonMuon.dst_kind(), NodeKind::Muon);
        assert_eq!(RelationKind::MuonJet.src_kind(), NodeKind::Muon);
        assert_eq!(RelationKind::MuonJet.dst_kind(), NodeKind::Jet);
        assert_eq!(RelationKind::JetMuon.src_kind(), NodeKind::Jet);
        assert_eq!(RelationKind::JetMuon.dst_kind(), NodeKind::Muon);
        assert_eq!(RelationKind::JetJet.src_kind(), NodeKind::Jet);
        assert_eq!(RelationKind::JetJet.dst_kind(), NodeKind::Jet);
    }

    #[test]
    fn relation_names_follow_table_naming() {
        assert_eq!(RelationKind::MuonJet.as_str(), "muon_jet");
        assert_eq!(NodeKind::Jet.as_str(), "jet");
    }
}
