use crate::core::fields::catalog::{self, UnknownFieldError};
use crate::core::models::label::ClassLabel;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.05;
pub const DEFAULT_TEST_FRACTION: f64 = 0.8;
pub const DEFAULT_EPOCHS: usize = 200;
pub const DEFAULT_HIDDEN_DIM: usize = 16;
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
pub const DEFAULT_WEIGHT_DECAY: f64 = 5e-4;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid split fractions: validation {validation} + test {test} must lie within [0, 1]")]
    InvalidSplitFractions { validation: f64, test: f64 },

    #[error("Parameter '{name}' must be positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },
}

/// One labeled event file feeding the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub label: ClassLabel,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>, label: ClassLabel) -> Self {
        Self {
            path: path.into(),
            label,
        }
    }
}

/// Which event branches become node feature columns, per node type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub muon_fields: Vec<String>,
    pub jet_fields: Vec<String>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            muon_fields: catalog::default_muon_fields(),
            jet_fields: catalog::default_jet_fields(),
        }
    }
}

impl FieldSelection {
    /// Checks every selected field against the branch catalog.
    pub fn validate(&self) -> Result<(), UnknownFieldError> {
        for key in self.muon_fields.iter().chain(&self.jet_fields) {
            catalog::resolve_family(key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyConfig {
    pub sources: Vec<SourceSpec>,
    pub fields: FieldSelection,
    pub include_jets: bool,
    /// Caps the events taken from each source, mostly for quick runs.
    pub max_events_per_source: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    pub validation_fraction: f64,
    pub test_fraction: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub hidden_dim: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub seed: Option<u64>,
}

/// Everything one end-to-end run needs, from event files to a trained model.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub assembly: AssemblyConfig,
    pub normalize: bool,
    pub split: SplitConfig,
    pub training: TrainingConfig,
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    sources: Vec<SourceSpec>,
    fields: Option<FieldSelection>,
    include_jets: Option<bool>,
    max_events_per_source: Option<usize>,
    normalize: Option<bool>,
    validation_fraction: Option<f64>,
    test_fraction: Option<f64>,
    split_seed: Option<u64>,
    epochs: Option<usize>,
    hidden_dim: Option<usize>,
    learning_rate: Option<f64>,
    weight_decay: Option<f64>,
    training_seed: Option<u64>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, path: impl Into<PathBuf>, label: ClassLabel) -> Self {
        self.sources.push(SourceSpec::new(path, label));
        self
    }
    pub fn sources(mut self, sources: Vec<SourceSpec>) -> Self {
        self.sources = sources;
        self
    }
    pub fn fields(mut self, fields: FieldSelection) -> Self {
        self.fields = Some(fields);
        self
    }
    pub fn include_jets(mut self, include: bool) -> Self {
        self.include_jets = Some(include);
        self
    }
    pub fn max_events_per_source(mut self, cap: usize) -> Self {
        self.max_events_per_source = Some(cap);
        self
    }
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = Some(normalize);
        self
    }
    pub fn validation_fraction(mut self, fraction: f64) -> Self {
        self.validation_fraction = Some(fraction);
        self
    }
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = Some(fraction);
        self
    }
    pub fn split_seed(mut self, seed: u64) -> Self {
        self.split_seed = Some(seed);
        self
    }
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = Some(epochs);
        self
    }
    pub fn hidden_dim(mut self, dim: usize) -> Self {
        self.hidden_dim = Some(dim);
        self
    }
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }
    pub fn weight_decay(mut self, decay: f64) -> Self {
        self.weight_decay = Some(decay);
        self
    }
    pub fn training_seed(mut self, seed: u64) -> Self {
        self.training_seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::MissingParameter("sources"));
        }

        let validation_fraction = self
            .validation_fraction
            .unwrap_or(DEFAULT_VALIDATION_FRACTION);
        let test_fraction = self.test_fraction.unwrap_or(DEFAULT_TEST_FRACTION);
        let valid_range = (0.0..=1.0).contains(&validation_fraction)
            && (0.0..=1.0).contains(&test_fraction)
            && validation_fraction + test_fraction <= 1.0;
        if !valid_range {
            return Err(ConfigError::InvalidSplitFractions {
                validation: validation_fraction,
                test: test_fraction,
            });
        }

        let learning_rate = self.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE);
        if learning_rate <= 0.0 {
            return Err(ConfigError::NonPositiveParameter {
                name: "learning_rate",
                value: learning_rate,
            });
        }
        let hidden_dim = self.hidden_dim.unwrap_or(DEFAULT_HIDDEN_DIM);
        if hidden_dim == 0 {
            return Err(ConfigError::NonPositiveParameter {
                name: "hidden_dim",
                value: 0.0,
            });
        }

        Ok(PipelineConfig {
            assembly: AssemblyConfig {
                sources: self.sources,
                fields: self.fields.unwrap_or_default(),
                include_jets: self.include_jets.unwrap_or(false),
                max_events_per_source: self.max_events_per_source,
            },
            normalize: self.normalize.unwrap_or(true),
            split: SplitConfig {
                validation_fraction,
                test_fraction,
                seed: self.split_seed,
            },
            training: TrainingConfig {
                epochs: self.epochs.unwrap_or(DEFAULT_EPOCHS),
                hidden_dim,
                learning_rate,
                weight_decay: self.weight_decay.unwrap_or(DEFAULT_WEIGHT_DECAY),
                seed: self.training_seed,
            },
        })
    }
}
