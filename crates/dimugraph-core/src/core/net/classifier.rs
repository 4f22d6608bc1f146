use super::conv::{normalized_adjacency, propagate};
use super::optim::Adam;
use crate::core::models::graph::EventGraph;
use crate::core::models::ids::{NodeKind, RelationKind};
use crate::core::models::label::ClassLabel;
use crate::core::models::split::{Split, SplitMasks};
use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-node class probabilities for every node in a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeScores {
    muons: DMatrix<f64>,
    jets: DMatrix<f64>,
}

impl NodeScores {
    pub fn new(muons: DMatrix<f64>, jets: DMatrix<f64>) -> Self {
        Self { muons, jets }
    }

    /// The full probability matrix for one node type, one row per node.
    pub fn class_probabilities(&self, kind: NodeKind) -> &DMatrix<f64> {
        match kind {
            NodeKind::Muon => &self.muons,
            NodeKind::Jet => &self.jets,
        }
    }

    /// Signal-class probability per node of `kind`, in id order.
    pub fn signal_scores(&self, kind: NodeKind) -> Vec<f64> {
        let probabilities = self.class_probabilities(kind);
        let signal = ClassLabel::Signal.index();
        (0..probabilities.nrows())
            .map(|row| probabilities[(row, signal)])
            .collect()
    }

    /// Most probable class index per node of `kind`, in id order.
    pub fn predictions(&self, kind: NodeKind) -> Vec<usize> {
        let probabilities = self.class_probabilities(kind);
        (0..probabilities.nrows())
            .map(|row| {
                let mut best = 0;
                for class in 1..probabilities.ncols() {
                    if probabilities[(row, class)] > probabilities[(row, best)] {
                        best = class;
                    }
                }
                best
            })
            .collect()
    }

    /// Signal scores of all nodes in stacked order (muons, then jets),
    /// matching [`EventGraph::stacked_labels`].
    pub fn stacked_signal_scores(&self) -> Vec<f64> {
        let mut scores = self.signal_scores(NodeKind::Muon);
        scores.extend(self.signal_scores(NodeKind::Jet));
        scores
    }

    /// Predicted class indices of all nodes in stacked order.
    pub fn stacked_predictions(&self) -> Vec<usize> {
        let mut predictions = self.predictions(NodeKind::Muon);
        predictions.extend(self.predictions(NodeKind::Jet));
        predictions
    }
}

/// The capability a training run needs from a node classifier.
///
/// The pipeline owns epochs, evaluation, and persistence; implementations
/// own the model itself. An implementation is constructed over one graph and
/// scores every node of that graph.
pub trait NodeClassifier {
    /// Number of classes the classifier scores.
    fn num_classes(&self) -> usize;

    /// Runs one optimization pass over the nodes `masks` assigns to
    /// [`Split::Train`] and returns the training loss.
    fn fit_epoch(&mut self, masks: &SplitMasks) -> f64;

    /// Scores every node of the graph with the current parameters.
    fn scores(&self) -> NodeScores;
}

/// Learned parameters of a [`RelationalGcn`], serializable on their own so a
/// trained model can be persisted and reloaded against the same graph shape.
///
/// Relation-indexed vectors follow [`RelationKind::ALL`] order; node-type
/// indexed vectors list muons before jets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcnParameters {
    hidden_dim: usize,
    layer_one: Vec<DMatrix<f64>>,
    hidden_bias: Vec<DMatrix<f64>>,
    layer_two: Vec<DMatrix<f64>>,
    output_bias: Vec<DMatrix<f64>>,
}

impl GcnParameters {
    /// Glorot-initialized parameters for a graph with the given per-type
    /// feature widths.
    pub fn init<R: Rng + ?Sized>(
        muon_features: usize,
        jet_features: usize,
        hidden_dim: usize,
        rng: &mut R,
    ) -> Self {
        let width = |kind: NodeKind| match kind {
            NodeKind::Muon => muon_features,
            NodeKind::Jet => jet_features,
        };
        let layer_one = RelationKind::ALL
            .iter()
            .map(|&r| glorot(width(r.src_kind()), hidden_dim, rng))
            .collect();
        let layer_two = RelationKind::ALL
            .iter()
            .map(|_| glorot(hidden_dim, ClassLabel::NUM_CLASSES, rng))
            .collect();
        Self {
            hidden_dim,
            layer_one,
            hidden_bias: vec![DMatrix::zeros(1, hidden_dim); 2],
            layer_two,
            output_bias: vec![DMatrix::zeros(1, ClassLabel::NUM_CLASSES); 2],
        }
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }
}

fn glorot<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> DMatrix<f64> {
    let limit = (6.0 / (rows + cols) as f64).sqrt();
    DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-limit..limit))
}

fn relation_index(kind: RelationKind) -> usize {
    match kind {
        RelationKind::MuonMuon => 0,
        RelationKind::MuonJet => 1,
        RelationKind::JetMuon => 2,
        RelationKind::JetJet => 3,
    }
}

fn kind_index(kind: NodeKind) -> usize {
    match kind {
        NodeKind::Muon => 0,
        NodeKind::Jet => 1,
    }
}

const NODE_KINDS: [NodeKind; 2] = [NodeKind::Muon, NodeKind::Jet];

/// A two-layer graph convolutional classifier over the heterogeneous event
/// graph.
///
/// Each relation carries its own weight matrices; messages from every
/// relation targeting a node type are summed, passed through ReLU, and
/// projected to class logits. The adjacency structure and first-layer
/// feature aggregates are fixed for the life of the model, so both are
/// computed once at construction.
pub struct RelationalGcn {
    parameters: GcnParameters,
    optimizer: Adam,
    // Per relation, ALL order: normalized adjacency and its product with
    // the source features.
    adjacency: [DMatrix<f64>; 4],
    messages: [DMatrix<f64>; 4],
    labels: [Vec<ClassLabel>; 2],
}

struct ForwardPass {
    pre_hidden: [DMatrix<f64>; 2],
    hidden: [DMatrix<f64>; 2],
    propagated_hidden: [DMatrix<f64>; 4],
    probabilities: [DMatrix<f64>; 2],
}

impl RelationalGcn {
    /// Builds a freshly initialized classifier over `graph`.
    pub fn new<R: Rng + ?Sized>(
        graph: &EventGraph,
        hidden_dim: usize,
        learning_rate: f64,
        weight_decay: f64,
        rng: &mut R,
    ) -> Self {
        let parameters = GcnParameters::init(
            graph.muons().num_features(),
            graph.jets().num_features(),
            hidden_dim,
            rng,
        );
        Self::with_parameters(graph, parameters, learning_rate, weight_decay)
    }

    /// Builds a classifier over `graph` from previously learned parameters.
    pub fn with_parameters(
        graph: &EventGraph,
        parameters: GcnParameters,
        learning_rate: f64,
        weight_decay: f64,
    ) -> Self {
        let adjacency = RelationKind::ALL.map(|r| {
            normalized_adjacency(
                graph.relation(r),
                graph.node_count(r.src_kind()),
                graph.node_count(r.dst_kind()),
            )
        });
        let messages = RelationKind::ALL.map(|r| {
            propagate(
                &adjacency[relation_index(r)],
                graph.node_table(r.src_kind()).features(),
            )
        });
        let labels = NODE_KINDS.map(|kind| graph.node_table(kind).labels().to_vec());
        Self {
            parameters,
            optimizer: Adam::new(learning_rate, weight_decay),
            adjacency,
            messages,
            labels,
        }
    }

    pub fn parameters(&self) -> &GcnParameters {
        &self.parameters
    }

    fn forward(&self) -> ForwardPass {
        let hidden_dim = self.parameters.hidden_dim;

        let mut pre_hidden =
            NODE_KINDS.map(|kind| DMatrix::zeros(self.labels[kind_index(kind)].len(), hidden_dim));
        for &relation in &RelationKind::ALL {
            let r = relation_index(relation);
            let dst = kind_index(relation.dst_kind());
            pre_hidden[dst] += &self.messages[r] * &self.parameters.layer_one[r];
        }
        for (t, pre) in pre_hidden.iter_mut().enumerate() {
            add_row_bias(pre, &self.parameters.hidden_bias[t]);
        }

        let hidden = [pre_hidden[0].map(relu), pre_hidden[1].map(relu)];

        let propagated_hidden = RelationKind::ALL.map(|relation| {
            let r = relation_index(relation);
            propagate(&self.adjacency[r], &hidden[kind_index(relation.src_kind())])
        });

        let mut logits = NODE_KINDS.map(|kind| {
            DMatrix::zeros(
                self.labels[kind_index(kind)].len(),
                ClassLabel::NUM_CLASSES,
            )
        });
        for &relation in &RelationKind::ALL {
            let r = relation_index(relation);
            let dst = kind_index(relation.dst_kind());
            logits[dst] += &propagated_hidden[r] * &self.parameters.layer_two[r];
        }
        for (t, logit) in logits.iter_mut().enumerate() {
            add_row_bias(logit, &self.parameters.output_bias[t]);
        }

        let probabilities = [row_softmax(&logits[0]), row_softmax(&logits[1])];
        ForwardPass {
            pre_hidden,
            hidden,
            propagated_hidden,
            probabilities,
        }
    }
}

impl NodeClassifier for RelationalGcn {
    fn num_classes(&self) -> usize {
        ClassLabel::NUM_CLASSES
    }

    fn scores(&self) -> NodeScores {
        let pass = self.forward();
        let [muons, jets] = pass.probabilities;
        NodeScores::new(muons, jets)
    }

    fn fit_epoch(&mut self, masks: &SplitMasks) -> f64 {
        let train_rows =
            NODE_KINDS.map(|kind| masks.for_kind(kind).indices(Split::Train).collect::<Vec<_>>());
        let train_total: usize = train_rows.iter().map(Vec::len).sum();
        if train_total == 0 {
            return 0.0;
        }
        for (t, labels) in self.labels.iter().enumerate() {
            debug_assert_eq!(masks.for_kind(NODE_KINDS[t]).len(), labels.len());
        }

        let pass = self.forward();

        // Mean cross-entropy over the train nodes of both types, and its
        // gradient on the logits.
        let mut loss = 0.0;
        let mut logit_grads = [
            DMatrix::zeros(pass.probabilities[0].nrows(), ClassLabel::NUM_CLASSES),
            DMatrix::zeros(pass.probabilities[1].nrows(), ClassLabel::NUM_CLASSES),
        ];
        for (t, rows) in train_rows.iter().enumerate() {
            for &row in rows {
                let target = self.labels[t][row].index();
                let p = pass.probabilities[t][(row, target)];
                loss -= p.max(1e-12).ln();
                for class in 0..ClassLabel::NUM_CLASSES {
                    let indicator = if class == target { 1.0 } else { 0.0 };
                    logit_grads[t][(row, class)] =
                        (pass.probabilities[t][(row, class)] - indicator) / train_total as f64;
                }
            }
        }
        loss /= train_total as f64;

        // Second layer: per-relation weights see the propagated hidden state
        // of their source type.
        let mut layer_two_grads = Vec::with_capacity(RelationKind::ALL.len());
        let mut hidden_grads = [
            DMatrix::zeros(pass.hidden[0].nrows(), pass.hidden[0].ncols()),
            DMatrix::zeros(pass.hidden[1].nrows(), pass.hidden[1].ncols()),
        ];
        for &relation in &RelationKind::ALL {
            let r = relation_index(relation);
            let dst = kind_index(relation.dst_kind());
            let src = kind_index(relation.src_kind());
            layer_two_grads.push(pass.propagated_hidden[r].transpose() * &logit_grads[dst]);
            hidden_grads[src] += self.adjacency[r].transpose()
                * (&logit_grads[dst] * self.parameters.layer_two[r].transpose());
        }
        let output_bias_grads: Vec<DMatrix<f64>> = logit_grads.iter().map(column_sums).collect();

        // ReLU gate, then first-layer weights against the fixed messages.
        let pre_hidden_grads: Vec<DMatrix<f64>> = hidden_grads
            .iter()
            .zip(&pass.pre_hidden)
            .map(|(grad, pre)| grad.zip_map(pre, |g, a| if a > 0.0 { g } else { 0.0 }))
            .collect();
        let mut layer_one_grads = Vec::with_capacity(RelationKind::ALL.len());
        for &relation in &RelationKind::ALL {
            let r = relation_index(relation);
            let dst = kind_index(relation.dst_kind());
            layer_one_grads.push(self.messages[r].transpose() * &pre_hidden_grads[dst]);
        }
        let hidden_bias_grads: Vec<DMatrix<f64>> =
            pre_hidden_grads.iter().map(column_sums).collect();

        let mut gradients = Vec::with_capacity(12);
        gradients.extend(layer_one_grads);
        gradients.extend(hidden_bias_grads);
        gradients.extend(layer_two_grads);
        gradients.extend(output_bias_grads);

        let parameters = &mut self.parameters;
        let mut slots: Vec<&mut DMatrix<f64>> = Vec::with_capacity(12);
        slots.extend(parameters.layer_one.iter_mut());
        slots.extend(parameters.hidden_bias.iter_mut());
        slots.extend(parameters.layer_two.iter_mut());
        slots.extend(parameters.output_bias.iter_mut());
        self.optimizer.step(&mut slots, &gradients);

        loss
    }
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn add_row_bias(matrix: &mut DMatrix<f64>, bias: &DMatrix<f64>) {
    debug_assert_eq!(bias.nrows(), 1);
    debug_assert_eq!(matrix.ncols(), bias.ncols());
    for mut row in matrix.row_iter_mut() {
        row += bias.row(0);
    }
}

fn column_sums(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let mut sums = DMatrix::zeros(1, matrix.ncols());
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            sums[(0, col)] += matrix[(row, col)];
        }
    }
    sums
}

fn row_softmax(logits: &DMatrix<f64>) -> DMatrix<f64> {
    let mut probabilities = logits.clone();
    for mut row in probabilities.row_iter_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for value in row.iter_mut() {
            *value = (*value - max).exp();
            total += *value;
        }
        for value in row.iter_mut() {
            *value /= total;
        }
    }
    probabilities
}
