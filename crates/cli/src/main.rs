use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipstudio_cli::cli::Cli;
use clipstudio_cli::commands;
use clipstudio_cli::config::AppConfig;
use clipstudio_cli::error::AppResult;
use clipstudio_cli::state::AppState;

const DEFAULT_LOG_FILTER: &str = "clipstudio=info,clipstudio_cli=info,clipstudio_veo=info,clipstudio_db=info";
const VERBOSE_LOG_FILTER: &str =
    "clipstudio=debug,clipstudio_cli=debug,clipstudio_veo=debug,clipstudio_db=debug,clipstudio_core=debug";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // --- Tracing ---
    // Logs go to stderr; stdout is reserved for command output.
    let default_filter = if cli.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("Error: {}", err.user_message());
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // --- Configuration ---
    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    // --- Database ---
    let state = AppState::init(config).await?;

    commands::dispatch(&state, cli.command).await
}
