//! Graph neural network primitives for node classification.
//!
//! This module provides the pieces a classifier over the heterogeneous event
//! graph is built from: degree-normalized relation propagation, an Adam
//! optimizer, and a two-layer relational graph convolutional network behind
//! the [`classifier::NodeClassifier`] trait the training pipeline consumes.

pub mod classifier;
pub mod conv;
pub mod optim;
