use crate::cli::CompareArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use dimugraph::engine::progress::ProgressReporter;
use dimugraph::workflows;
use tracing::info;

pub fn run(args: CompareArgs) -> Result<()> {
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Comparing {} run(s).", args.runs.len());
    let rankings = workflows::compare::run(&args.runs, args.output.as_deref(), &reporter)?;

    print_ranking_table(&rankings);
    if let Some(output) = &args.output {
        println!("✓ Comparison summary written to: {}", output.display());
    }

    Ok(())
}

pub fn print_ranking_table(rankings: &[workflows::compare::RunRanking]) {
    println!();
    println!(
        "{:<6}{:<28}{:>10}  {:<12}{:<6}",
        "Rank", "Run", "AUROC", "Normalized", "Jets"
    );
    println!("{}", "-".repeat(64));
    for (i, ranking) in rankings.iter().enumerate() {
        println!(
            "{:<6}{:<28}{:>10.4}  {:<12}{:<6}",
            i + 1,
            ranking.name,
            ranking.auroc,
            ranking.normalized,
            ranking.jets
        );
    }
    if let Some(best) = rankings.first() {
        println!();
        println!("✓ Best run: {} (AUROC {:.4})", best.name, best.auroc);
    }
}
