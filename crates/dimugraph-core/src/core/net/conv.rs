use crate::core::models::graph::InteractionTable;
use nalgebra::DMatrix;

// Degrees below this are treated as isolated and contribute nothing.
const DEGREE_EPSILON: f64 = 1e-10;

/// Builds the degree-normalized weighted adjacency of one relation.
///
/// The result has one row per destination node and one column per source
/// node. Entry `(d, s)` is the summed edge weight from `s` to `d` divided by
/// `sqrt(deg(d) * deg(s))`, where a node's degree sums the weights incident
/// to it within this relation. Relations whose endpoints share a node type
/// receive unit self-loops before normalization so a node's own features
/// survive aggregation; nodes with no incident edges stay all-zero.
pub fn normalized_adjacency(
    table: &InteractionTable,
    src_count: usize,
    dst_count: usize,
) -> DMatrix<f64> {
    let mut adjacency = DMatrix::zeros(dst_count, src_count);
    for edge in table.edges() {
        adjacency[(edge.dst as usize, edge.src as usize)] += edge.weight;
    }
    if table.kind().src_kind() == table.kind().dst_kind() {
        debug_assert_eq!(src_count, dst_count);
        for i in 0..dst_count.min(src_count) {
            adjacency[(i, i)] += 1.0;
        }
    }

    let dst_degrees: Vec<f64> = (0..dst_count).map(|i| adjacency.row(i).sum()).collect();
    let src_degrees: Vec<f64> = (0..src_count).map(|j| adjacency.column(j).sum()).collect();

    for i in 0..dst_count {
        for j in 0..src_count {
            let scale = dst_degrees[i] * src_degrees[j];
            if scale > DEGREE_EPSILON {
                adjacency[(i, j)] /= scale.sqrt();
            } else {
                adjacency[(i, j)] = 0.0;
            }
        }
    }
    adjacency
}

/// Aggregates source-node features onto destination nodes.
pub fn propagate(adjacency: &DMatrix<f64>, src_features: &DMatrix<f64>) -> DMatrix<f64> {
    adjacency * src_features
}
