mod report_cmd;
mod router;
pub mod server;
mod state;
pub mod tracing;

pub use router::main_router;
pub use state::AppState;

use crate::config::{Cli, Command};
use clap::Parser;
use tokio_util::sync::CancellationToken;

/// Application entry point: parses the command line and dispatches.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Health check only; keep the output free of log lines.
    if let Some(port) = cli.healthcheck_port() {
        match crate::healthcheck_with_port(port).await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1)
            }
        }
    }

    tracing::init_tracing();

    let config = cli.config;
    config.validate()?;
    ::tracing::info!("Loaded settings");

    let state = AppState::from_config(&config)?;

    match cli.command {
        Some(Command::Report(args)) => report_cmd::run_report(&state.report_service, args).await,
        _ => {
            let shutdown_token = CancellationToken::new();
            let app = main_router(state.report_service, state.keywords);
            server::serve(app, &config.bind_host, config.port, shutdown_token).await?;
            Ok(())
        }
    }
}
