mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let report = commands::run(cli).await?;
    output::render(&report, cli.format, cli.pretty)?;

    let failed = report.failed_fetches();
    if cli.strict && failed > 0 {
        return Err(CliError::FetchFailures { failed });
    }
    if failed > 0 {
        log::warn!("{failed} currency fetch(es) failed; their days are shown as gaps");
    }

    Ok(())
}
