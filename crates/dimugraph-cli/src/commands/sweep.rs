use crate::cli::SweepArgs;
use crate::config::{PartialPipelineConfig, RunOverrides};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use dimugraph::{
    core::io::events::JsonlEvents, engine::progress::ProgressReporter, workflows,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

pub fn run(args: SweepArgs) -> Result<()> {
    let partial_config = PartialPipelineConfig::load(args.dataset.config.as_deref())?;

    // All runs share the same split and initialization seeds.
    let split_seed = args.run.split_seed.unwrap_or_else(clock_seed);
    let training_seed = args.run.training_seed.unwrap_or_else(clock_seed);
    info!(
        split_seed,
        training_seed, "Sweep seeds fixed for every run."
    );

    let total = args.sizes.len() * 2;
    println!(
        "Sweeping {} run(s) over {} dataset size(s)...",
        total,
        args.sizes.len()
    );

    let mut run_dirs = Vec::with_capacity(total);
    for &size in &args.sizes {
        for normalize in [true, false] {
            let name = if normalize {
                format!("{}_normalize", size)
            } else {
                format!("{}_no_normalize", size)
            };
            println!("[{}/{}] {}", run_dirs.len() + 1, total, name);

            let mut dataset = args.dataset.clone();
            dataset.max_events = Some(size);
            dataset.normalize = normalize;
            dataset.no_normalize = !normalize;

            let mut overrides = RunOverrides::from_run_args(&args.run);
            overrides.split_seed = Some(split_seed);
            overrides.training_seed = Some(training_seed);
            let config = partial_config
                .clone()
                .merge_with_cli(&dataset, &overrides)?;

            let progress_handler = CliProgressHandler::new();
            let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

            info!("Training sweep run '{}'.", name);
            let result = workflows::train::run::<JsonlEvents>(
                &config,
                &args.run.runs_dir,
                Some(&name),
                &reporter,
            )?;

            println!("  test AUROC {:.4}", result.evaluation.auroc);
            run_dirs.push(result.run_dir.root().to_path_buf());
        }
    }

    info!("Sweep finished, ranking {} run(s).", run_dirs.len());
    let summary = args.run.runs_dir.join("comparison.csv");
    let reporter = ProgressReporter::new();
    let rankings = workflows::compare::run(&run_dirs, Some(&summary), &reporter)?;

    super::compare::print_ranking_table(&rankings);
    println!("✓ Comparison summary written to: {}", summary.display());

    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
