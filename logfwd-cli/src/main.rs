use std::process::ExitCode;

use clap::Parser;

use logfwd_cli::cli::{Cli, Commands};
use logfwd_cli::commands;
use logfwd_cli::error::CliError;
use logfwd_cli::logging;
use logfwd_cli::output::OutputWriter;
use logfwd_cli::settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = settings::load(&cli).await?;

    logging::init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;
    tracing::debug!(command = ?cli.command, "logfwd starting");

    let writer = OutputWriter::new(cli.output_format);

    match cli.command {
        Commands::Send(args) => commands::send::execute(args, &config).await,
        Commands::Inspect(args) => commands::inspect::execute(args, &writer).await,
        Commands::Check(args) => commands::check::execute(args, &config, &writer),
    }
}
