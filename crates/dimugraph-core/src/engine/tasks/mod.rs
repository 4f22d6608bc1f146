//! Tasks for dataset assembly, preprocessing, and classifier training.
//!
//! Tasks are the core computational units of the pipeline. Each submodule
//! implements one stage: reading event files into a graph, normalizing node
//! features, partitioning nodes into splits, fitting the classifier, and
//! scoring it against the held-out nodes. Tasks are designed to be modular
//! and composable, and the workflow layer chains them into complete runs.

pub mod assemble;
pub mod evaluate;
pub mod normalize;
pub mod partition;
pub mod train;
