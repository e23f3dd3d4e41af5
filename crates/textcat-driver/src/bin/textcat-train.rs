use clap::Parser;
use std::process::ExitCode;
use textcat_driver::cli::TrainArgs;
use textcat_driver::{init_logging, run_train};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = TrainArgs::parse();
    init_logging(args.common.verbose);

    let outcome = run_train(&args, &mut std::io::stdout()).await?;
    Ok(outcome.into())
}
