use super::ids::NodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The partition a node is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split assignments for one node table, index-aligned with node ids.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMask {
    assignments: Vec<Split>,
}

impl SplitMask {
    pub fn new(assignments: Vec<Split>) -> Self {
        Self { assignments }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The split of the node in row `row`.
    pub fn get(&self, row: usize) -> Option<Split> {
        self.assignments.get(row).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Split> + '_ {
        self.assignments.iter().copied()
    }

    /// Number of nodes assigned to `split`.
    pub fn count(&self, split: Split) -> usize {
        self.assignments.iter().filter(|&&s| s == split).count()
    }

    /// Row indices assigned to `split`, in id order.
    pub fn indices(&self, split: Split) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter(move |&(_, &s)| s == split)
            .map(|(row, _)| row)
    }
}

/// Split assignments for both node tables of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMasks {
    pub muons: SplitMask,
    pub jets: SplitMask,
}

impl SplitMasks {
    pub fn for_kind(&self, kind: NodeKind) -> &SplitMask {
        match kind {
            NodeKind::Muon => &self.muons,
            NodeKind::Jet => &self.jets,
        }
    }

    /// Splits of all nodes in stacked order (muons, then jets), matching
    /// [`super::graph::EventGraph::stacked_labels`].
    pub fn stacked(&self) -> Vec<Split> {
        let mut stacked = Vec::with_capacity(self.muons.len() + self.jets.len());
        stacked.extend(self.muons.iter());
        stacked.extend(self.jets.iter());
        stacked
    }
}
