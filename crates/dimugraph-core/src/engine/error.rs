use thiserror::Error;

use crate::core::fields::catalog::UnknownFieldError;
use crate::core::io::artifacts::ArtifactError;
use crate::core::io::stats::StatsError;
use crate::core::io::tables::TableError;
use crate::core::models::graph::GraphError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Failed to read event source '{path}': {message}")]
    EventSource { path: String, message: String },

    #[error("Event {event} in '{path}' is missing required branch '{branch}'")]
    MissingBranch {
        path: String,
        event: usize,
        branch: String,
    },

    #[error(
        "Event {event} in '{path}': branch '{branch}' has {len} entries but entry {index} was required"
    )]
    ShortBranch {
        path: String,
        event: usize,
        branch: String,
        index: usize,
        len: usize,
    },

    #[error("Unusable field selection: {source}")]
    UnknownField {
        #[from]
        source: UnknownFieldError,
    },

    #[error("Assembled graph failed validation: {source}")]
    Graph {
        #[from]
        source: GraphError,
    },

    #[error("Dataset table error: {source}")]
    Dataset {
        #[from]
        source: TableError,
    },

    #[error("Normalization statistics error: {source}")]
    Stats {
        #[from]
        source: StatsError,
    },

    #[error("Run artifact error: {source}")]
    Artifact {
        #[from]
        source: ArtifactError,
    },

    #[error("Normalization requires statistics for column '{column}'")]
    MissingStatistics { column: String },

    #[error(
        "Invalid split fractions: validation {validation} + test {test} must lie within [0, 1]"
    )]
    InvalidSplitFractions { validation: f64, test: f64 },

    #[error("Training failed at epoch {epoch}: {message}")]
    Training { epoch: usize, message: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
