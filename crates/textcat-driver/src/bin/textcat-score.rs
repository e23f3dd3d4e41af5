use clap::Parser;
use std::process::ExitCode;
use textcat_driver::cli::ScoreArgs;
use textcat_driver::{init_logging, run_score, PromptSelector};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = ScoreArgs::parse();
    init_logging(args.common.verbose);

    let mut selector = PromptSelector::stdin();
    let outcome = run_score(&args, &mut selector, &mut std::io::stdout()).await?;
    Ok(outcome.into())
}
