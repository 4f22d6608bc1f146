use crate::cli::{DatasetArgs, RunArgs};
use crate::error::{CliError, Result};
use dimugraph::core::models::label::ClassLabel;
use dimugraph::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cap applied to every source when neither the file nor the CLI sets one.
pub const DEFAULT_MAX_EVENTS: usize = 1_000_000;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSource {
    path: PathBuf,
    label: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialFields {
    muons: Option<Vec<String>>,
    jets: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSplit {
    #[serde(rename = "validation-fraction")]
    validation_fraction: Option<f64>,
    #[serde(rename = "test-fraction")]
    test_fraction: Option<f64>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialTraining {
    epochs: Option<usize>,
    #[serde(rename = "hidden-dim")]
    hidden_dim: Option<usize>,
    #[serde(rename = "learning-rate")]
    learning_rate: Option<f64>,
    #[serde(rename = "weight-decay")]
    weight_decay: Option<f64>,
    seed: Option<u64>,
}

/// The pipeline configuration as it appears in a TOML file, every value
/// optional so CLI arguments can fill the gaps.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialPipelineConfig {
    sources: Option<Vec<PartialSource>>,
    fields: Option<PartialFields>,
    jets: Option<bool>,
    normalize: Option<bool>,
    #[serde(rename = "max-events")]
    max_events: Option<usize>,
    split: Option<PartialSplit>,
    training: Option<PartialTraining>,
}

/// Per-run overrides collected from command arguments; CLI values win over
/// the configuration file.
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub epochs: Option<usize>,
    pub hidden_dim: Option<usize>,
    pub learning_rate: Option<f64>,
    pub weight_decay: Option<f64>,
    pub validation_fraction: Option<f64>,
    pub test_fraction: Option<f64>,
    pub split_seed: Option<u64>,
    pub training_seed: Option<u64>,
}

impl RunOverrides {
    pub fn from_run_args(args: &RunArgs) -> Self {
        Self {
            epochs: args.epochs,
            validation_fraction: args.validation_fraction,
            test_fraction: args.test_fraction,
            split_seed: args.split_seed,
            training_seed: args.training_seed,
            ..Default::default()
        }
    }
}

impl PartialPipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file when one is given, an empty configuration otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(
        mut self,
        dataset: &DatasetArgs,
        run: &RunOverrides,
    ) -> Result<core_config::PipelineConfig> {
        let mut builder = core_config::PipelineConfigBuilder::new();

        let mut sources = Vec::new();
        if let Some(path) = &dataset.signal {
            sources.push(core_config::SourceSpec::new(path, ClassLabel::Signal));
        }
        if let Some(path) = &dataset.background {
            sources.push(core_config::SourceSpec::new(path, ClassLabel::Background));
        }
        if sources.is_empty() {
            for source in self.sources.take().unwrap_or_default() {
                let label: ClassLabel = source.label.parse().map_err(|_| {
                    CliError::Config(format!(
                        "Unknown class label '{}' (expected 'Signal' or 'Background')",
                        source.label
                    ))
                })?;
                sources.push(core_config::SourceSpec::new(&source.path, label));
            }
        }
        builder = builder.sources(sources);

        if let Some(fields) = self.fields.take() {
            let mut selection = core_config::FieldSelection::default();
            if let Some(muons) = fields.muons {
                selection.muon_fields = muons;
            }
            if let Some(jets) = fields.jets {
                selection.jet_fields = jets;
            }
            builder = builder.fields(selection);
        }

        if dataset.jets {
            builder = builder.include_jets(true);
        } else if let Some(jets) = self.jets {
            builder = builder.include_jets(jets);
        }

        if dataset.no_normalize {
            builder = builder.normalize(false);
        } else if dataset.normalize {
            builder = builder.normalize(true);
        } else if let Some(normalize) = self.normalize {
            builder = builder.normalize(normalize);
        }

        let cap = dataset
            .max_events
            .or(self.max_events)
            .unwrap_or(DEFAULT_MAX_EVENTS);
        builder = builder.max_events_per_source(cap);

        let split = self.split.take().unwrap_or_default();
        if let Some(fraction) = run.validation_fraction.or(split.validation_fraction) {
            builder = builder.validation_fraction(fraction);
        }
        if let Some(fraction) = run.test_fraction.or(split.test_fraction) {
            builder = builder.test_fraction(fraction);
        }
        if let Some(seed) = run.split_seed.or(split.seed) {
            builder = builder.split_seed(seed);
        }

        let training = self.training.take().unwrap_or_default();
        if let Some(epochs) = run.epochs.or(training.epochs) {
            builder = builder.epochs(epochs);
        }
        if let Some(dim) = run.hidden_dim.or(training.hidden_dim) {
            builder = builder.hidden_dim(dim);
        }
        if let Some(rate) = run.learning_rate.or(training.learning_rate) {
            builder = builder.learning_rate(rate);
        }
        if let Some(decay) = run.weight_decay.or(training.weight_decay) {
            builder = builder.weight_decay(decay);
        }
        if let Some(seed) = run.training_seed.or(training.seed) {
            builder = builder.training_seed(seed);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn dataset_args() -> DatasetArgs {
        DatasetArgs {
            signal: None,
            background: None,
            config: None,
            jets: false,
            normalize: false,
            no_normalize: false,
            max_events: None,
        }
    }

    fn write_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("pipeline.toml");
        fs::write(&path, content).unwrap();
        path
    }

    const FULL_CONFIG: &str = r#"
normalize = false
jets = true
max-events = 5000

[[sources]]
path = "data/signal.jsonl"
label = "Signal"

[[sources]]
path = "data/background.jsonl"
label = "Background"

[fields]
muons = ["muons.pt", "muons.eta"]
jets = ["jets.pt"]

[split]
validation-fraction = 0.1
test-fraction = 0.6
seed = 3

[training]
epochs = 80
hidden-dim = 24
learning-rate = 0.02
weight-decay = 0.001
seed = 4
"#;

    #[test]
    fn a_full_file_maps_onto_the_pipeline_config() {
        let dir = tempdir().unwrap();
        let path = write_config_file(dir.path(), FULL_CONFIG);

        let config = PartialPipelineConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&dataset_args(), &RunOverrides::default())
            .unwrap();

        assert_eq!(config.assembly.sources.len(), 2);
        assert_eq!(
            config.assembly.sources[0].path,
            PathBuf::from("data/signal.jsonl")
        );
        assert_eq!(config.assembly.sources[0].label, ClassLabel::Signal);
        assert_eq!(config.assembly.fields.muon_fields.len(), 2);
        assert!(config.assembly.include_jets);
        assert_eq!(config.assembly.max_events_per_source, Some(5000));
        assert!(!config.normalize);
        assert_eq!(config.split.validation_fraction, 0.1);
        assert_eq!(config.split.seed, Some(3));
        assert_eq!(config.training.epochs, 80);
        assert_eq!(config.training.hidden_dim, 24);
        assert_eq!(config.training.seed, Some(4));
    }

    #[test]
    fn cli_arguments_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(dir.path(), FULL_CONFIG);

        let mut dataset = dataset_args();
        dataset.signal = Some(PathBuf::from("other_signal.jsonl"));
        dataset.max_events = Some(10);
        dataset.normalize = true;
        let overrides = RunOverrides {
            epochs: Some(5),
            test_fraction: Some(0.5),
            ..Default::default()
        };

        let config = PartialPipelineConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&dataset, &overrides)
            .unwrap();

        // The CLI source list replaces the file's entirely.
        assert_eq!(config.assembly.sources.len(), 1);
        assert_eq!(
            config.assembly.sources[0].path,
            PathBuf::from("other_signal.jsonl")
        );
        assert_eq!(config.assembly.max_events_per_source, Some(10));
        // --normalize beats the file's `normalize = false`.
        assert!(config.normalize);
        assert_eq!(config.training.epochs, 5);
        assert_eq!(config.split.test_fraction, 0.5);
        // Values with no override keep their file settings.
        assert_eq!(config.training.hidden_dim, 24);
    }

    #[test]
    fn defaults_cover_an_absent_file() {
        let mut dataset = dataset_args();
        dataset.signal = Some(PathBuf::from("sig.jsonl"));
        dataset.background = Some(PathBuf::from("bg.jsonl"));

        let config = PartialPipelineConfig::load(None)
            .unwrap()
            .merge_with_cli(&dataset, &RunOverrides::default())
            .unwrap();

        assert_eq!(config.assembly.sources.len(), 2);
        assert!(config.normalize);
        assert!(!config.assembly.include_jets);
        assert_eq!(
            config.assembly.max_events_per_source,
            Some(DEFAULT_MAX_EVENTS)
        );
        assert_eq!(config.training.epochs, core_config::DEFAULT_EPOCHS);
    }

    #[test]
    fn missing_sources_are_a_configuration_error() {
        let err = PartialPipelineConfig::default()
            .merge_with_cli(&dataset_args(), &RunOverrides::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            dir.path(),
            r#"
[[sources]]
path = "events.jsonl"
label = "signal"
"#,
        );

        let err = PartialPipelineConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&dataset_args(), &RunOverrides::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(message) if message.contains("signal")));
    }

    #[test]
    fn unknown_keys_fail_parsing() {
        let dir = tempdir().unwrap();
        let path = write_config_file(dir.path(), "epochs = 10\n");

        assert!(matches!(
            PartialPipelineConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }
}
