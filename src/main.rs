//! drive_service CLI - List, upload and create files in Google Drive.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drive_service::{dispatch, Authenticator, Cli, CommandRequest, Config, DriveClient, DriveError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            if !e.use_stderr() {
                return ExitCode::SUCCESS;
            }
            eprintln!();
            eprint!("{}", Cli::usage());
            return ExitCode::from(2);
        }
    };

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let drive_error = e.downcast_ref::<DriveError>();
            if drive_error.is_some_and(DriveError::is_usage) {
                eprint!("{}", Cli::usage());
            }
            ExitCode::from(drive_error.map(DriveError::exit_code).unwrap_or(1))
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let request = CommandRequest::from_cli(&cli)?;

    if request == CommandRequest::Help {
        print!("{}", Cli::usage());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref()).context("Fail to load config file")?;

    let auth = Authenticator::from_config(&config);
    let client = DriveClient::new(&config, auth)?;

    dispatch(&request, &config, &client, &mut std::io::stdout())
        .await
        .with_context(|| describe(&request))?;

    Ok(())
}

fn describe(request: &CommandRequest) -> String {
    match request {
        CommandRequest::Help => "Failed to print help".to_string(),
        CommandRequest::List { folder } => format!("Failed to list folder {:?}", folder),
        CommandRequest::Upload { path, .. } => format!("Failed to upload {:?}", path),
        CommandRequest::UploadData { path } => format!("Failed to upload data file {:?}", path),
        CommandRequest::CreateFolder { name, .. } => format!("Failed to create folder {:?}", name),
    }
}
