//! Entry point for ccode.
use std::process::ExitCode;

use ccode::{
    cli::{execute_cli_command, CliCommand, CliContext, LaunchArgs, ParsedCommand},
    lib::telemetry,
    runtime::{self, RuntimeExit},
};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(code) => code,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<ExitCode, RuntimeExit> {
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;
    let args = LaunchArgs::parse();
    let command = args.into_command().map_err(RuntimeExit::from_error)?;

    match command {
        ParsedCommand::Launch(plan) => runtime::run_launch(plan).await,
        ParsedCommand::Cli { command, context } => handle_cli_command(command, context).await,
    }
}

async fn handle_cli_command(
    command: CliCommand,
    context: CliContext,
) -> Result<ExitCode, RuntimeExit> {
    let message = execute_cli_command(command, context)
        .await
        .map_err(RuntimeExit::from_error)?;
    println!("{message}");
    Ok(ExitCode::SUCCESS)
}
