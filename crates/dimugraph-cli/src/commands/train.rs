use crate::cli::TrainArgs;
use crate::config::{PartialPipelineConfig, RunOverrides};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use dimugraph::{
    core::io::events::JsonlEvents, engine::progress::ProgressReporter, workflows,
};
use tracing::info;

pub fn run(args: TrainArgs) -> Result<()> {
    let partial_config = PartialPipelineConfig::load(args.dataset.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let mut overrides = RunOverrides::from_run_args(&args.run);
    overrides.hidden_dim = args.hidden_dim;
    overrides.learning_rate = args.learning_rate;
    overrides.weight_decay = args.weight_decay;
    let final_config = partial_config.merge_with_cli(&args.dataset, &overrides)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting classifier training...");
    info!("Invoking the training workflow...");

    let result = workflows::train::run::<JsonlEvents>(
        &final_config,
        &args.run.runs_dir,
        args.name.as_deref(),
        &reporter,
    )?;

    info!(
        "Workflow finished: run '{}' with test AUROC {:.4}.",
        result.run_dir.name(),
        result.evaluation.auroc
    );

    println!("✓ Run written to: {}", result.run_dir.root().display());
    println!(
        "  {} events kept, {} epochs trained",
        result.report.events_kept,
        result.history.len()
    );
    if let Some(loss) = result.history.final_loss() {
        println!("  final loss:     {:.4}", loss);
    }
    if let Some((epoch, accuracy)) = result.history.best_validation() {
        println!("  best val acc:   {:.3} (epoch {})", accuracy, epoch);
    }
    println!("  test AUROC:     {:.4}", result.evaluation.auroc);
    println!("  test accuracy:  {:.3}", result.evaluation.test_accuracy);

    Ok(())
}
