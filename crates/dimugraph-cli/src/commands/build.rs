use crate::cli::BuildArgs;
use crate::config::{PartialPipelineConfig, RunOverrides};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use dimugraph::{
    core::io::events::JsonlEvents, engine::progress::ProgressReporter, workflows,
};
use tracing::info;

pub fn run(args: BuildArgs) -> Result<()> {
    let partial_config = PartialPipelineConfig::load(args.dataset.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_cli(&args.dataset, &RunOverrides::default())?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Assembling event graph...");
    info!("Invoking the build workflow...");

    let result = workflows::build::run::<JsonlEvents>(&final_config, &args.output, &reporter)?;

    info!(
        "Workflow finished: {} of {} events kept.",
        result.report.events_kept, result.report.events_read
    );

    println!(
        "✓ Dataset written to: {}",
        args.output.display()
    );
    println!(
        "  {} events kept ({} skipped), {} muon nodes, {} jet nodes, {} edges",
        result.report.events_kept,
        result.report.events_skipped,
        result.muons,
        result.jets,
        result.edges
    );

    Ok(())
}
