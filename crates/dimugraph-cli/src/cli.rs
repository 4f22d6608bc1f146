use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "DimuGraph Developers",
    version,
    about = "DimuGraph CLI - A command-line interface for DimuGraph, a graph-based classification pipeline for dimuon collision events.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble the event graph and write its dataset tables without training.
    Build(BuildArgs),
    /// Run the full pipeline: assemble, train, evaluate, and persist a run directory.
    Train(TrainArgs),
    /// Rank finished runs by the area under their test-split ROC curve.
    Compare(CompareArgs),
    /// Train one normalized and one raw run per dataset size, then rank them.
    Sweep(SweepArgs),
}

/// Dataset options shared by every command that assembles the graph.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Path to the signal event file (JSON Lines).
    #[arg(long, value_name = "PATH")]
    pub signal: Option<PathBuf>,

    /// Path to the background event file (JSON Lines).
    #[arg(long, value_name = "PATH")]
    pub background: Option<PathBuf>,

    /// Path to the pipeline configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Include jet nodes and their edges in the graph.
    #[arg(long)]
    pub jets: bool,

    /// Z-score normalize feature columns (overrides the config file).
    #[arg(long, conflicts_with = "no_normalize")]
    pub normalize: bool,

    /// Keep raw feature values instead of z-score normalizing them.
    #[arg(long)]
    pub no_normalize: bool,

    /// Cap the number of events read from each source.
    #[arg(long, value_name = "INT")]
    pub max_events: Option<usize>,
}

/// Training options shared by the `train` and `sweep` commands.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory under which run directories are created.
    #[arg(long, value_name = "PATH", default_value = "runs")]
    pub runs_dir: PathBuf,

    /// Override the number of training epochs.
    #[arg(long, value_name = "INT")]
    pub epochs: Option<usize>,

    /// Override the fraction of nodes held out for validation.
    #[arg(long, value_name = "FLOAT")]
    pub validation_fraction: Option<f64>,

    /// Override the fraction of nodes held out for testing.
    #[arg(long, value_name = "FLOAT")]
    pub test_fraction: Option<f64>,

    /// Seed for the node split shuffle.
    #[arg(long, value_name = "INT")]
    pub split_seed: Option<u64>,

    /// Seed for classifier parameter initialization.
    #[arg(long, value_name = "INT")]
    pub training_seed: Option<u64>,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Directory to write the dataset tables into.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `train` subcommand.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Name for the run directory; timestamped when omitted.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Override the hidden layer width.
    #[arg(long, value_name = "INT")]
    pub hidden_dim: Option<usize>,

    /// Override the Adam learning rate.
    #[arg(long, value_name = "FLOAT")]
    pub learning_rate: Option<f64>,

    /// Override the Adam weight decay.
    #[arg(long, value_name = "FLOAT")]
    pub weight_decay: Option<f64>,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Run directories to compare.
    #[arg(required = true, value_name = "DIR", num_args(1..))]
    pub runs: Vec<PathBuf>,

    /// Write the ranking as a CSV summary to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `sweep` subcommand.
#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Per-source event caps to sweep; each size trains a normalized and a
    /// raw run.
    #[arg(
        long,
        value_name = "INT",
        value_delimiter = ',',
        default_value = "1000000"
    )]
    pub sizes: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn train_arguments_parse_with_overrides() {
        let cli = Cli::parse_from([
            "dimugraph",
            "train",
            "--signal",
            "sig.jsonl",
            "--background",
            "bg.jsonl",
            "--jets",
            "--epochs",
            "50",
            "--hidden-dim",
            "32",
            "--split-seed",
            "7",
            "-n",
            "my_run",
        ]);

        match cli.command {
            Commands::Train(args) => {
                assert_eq!(args.dataset.signal.unwrap(), PathBuf::from("sig.jsonl"));
                assert!(args.dataset.jets);
                assert!(!args.dataset.no_normalize);
                assert_eq!(args.run.epochs, Some(50));
                assert_eq!(args.hidden_dim, Some(32));
                assert_eq!(args.run.split_seed, Some(7));
                assert_eq!(args.name.as_deref(), Some("my_run"));
                assert_eq!(args.run.runs_dir, PathBuf::from("runs"));
            }
            other => panic!("expected the train command, got {other:?}"),
        }
    }

    #[test]
    fn sweep_sizes_parse_from_a_comma_list() {
        let cli = Cli::parse_from([
            "dimugraph",
            "sweep",
            "--signal",
            "sig.jsonl",
            "--sizes",
            "100,1000",
        ]);

        match cli.command {
            Commands::Sweep(args) => {
                assert_eq!(args.sizes, vec![100, 1000]);
                assert!(args.dataset.signal.is_some());
            }
            other => panic!("expected the sweep command, got {other:?}"),
        }
    }

    #[test]
    fn normalize_conflicts_with_no_normalize() {
        assert!(
            Cli::try_parse_from([
                "dimugraph",
                "build",
                "--signal",
                "sig.jsonl",
                "--normalize",
                "--no-normalize",
                "-o",
                "out",
            ])
            .is_err()
        );
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dimugraph", "-q", "-v", "compare", "runs/a"]).is_err());
    }
}
