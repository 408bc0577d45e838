use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    revsight::init();

    let cli = revsight::cli::Cli::parse();
    revsight::cli::run(cli).await
}
