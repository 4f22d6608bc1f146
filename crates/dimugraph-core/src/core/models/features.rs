use super::ids::NodeKind;
use super::label::ClassLabel;
use nalgebra::DMatrix;

/// The node table of one node kind: per-row class labels aligned with a
/// dense feature matrix.
///
/// Row `k` of the matrix is the feature vector of the node with id `k`, so
/// the table realizes the dense zero-based id invariant by construction.
/// Columns are the selected field keys, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTable {
    kind: NodeKind,
    columns: Vec<String>,
    labels: Vec<ClassLabel>,
    features: DMatrix<f64>,
}

impl NodeTable {
    /// Creates an empty table with the given column layout.
    pub fn empty(kind: NodeKind, columns: Vec<String>) -> Self {
        let width = columns.len();
        Self {
            kind,
            columns,
            labels: Vec::new(),
            features: DMatrix::zeros(0, width),
        }
    }

    /// Builds a table from row-major feature values.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != labels.len() * columns.len()`. Callers
    /// assembling tables from untrusted input must validate row shapes
    /// before constructing the table.
    pub fn from_rows(
        kind: NodeKind,
        columns: Vec<String>,
        labels: Vec<ClassLabel>,
        values: Vec<f64>,
    ) -> Self {
        let features = DMatrix::from_row_slice(labels.len(), columns.len(), &values);
        Self {
            kind,
            columns,
            labels,
            features,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The field keys backing each feature column, in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a field key among the feature columns.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    /// Number of nodes (feature rows) in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of feature columns.
    pub fn num_features(&self) -> usize {
        self.columns.len()
    }

    /// Class label of the node in row `row`.
    pub fn label(&self, row: usize) -> Option<ClassLabel> {
        self.labels.get(row).copied()
    }

    /// All class labels, in id order.
    pub fn labels(&self) -> &[ClassLabel] {
        &self.labels
    }

    /// The feature matrix (rows = nodes in id order, columns = fields).
    pub fn features(&self) -> &DMatrix<f64> {
        &self.features
    }

    /// Mutable access to the feature matrix, for in-place normalization.
    pub fn features_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.features
    }
}
