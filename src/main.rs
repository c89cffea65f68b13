//! agent-builder - a minimal CLI that configures and launches a tool-using agent
//!
//! Answers a query given on the command line, or starts an interactive loop
//! where `!` runs shell commands and `>` runs Python code.

use agent_builder::cli::{self, Args};
use agent_builder::config::{process_env, LOG_FORMAT_ENV};
use agent_builder::telemetry::{Telemetry, TelemetryConfig};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stderr so they never mix with agent output. Spans also go to
/// the trace collector when one is configured.
fn init_logging(debug: bool, telemetry: Option<&Telemetry>) {
    let filter = if debug {
        EnvFilter::new("agent_builder=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let json = process_env(LOG_FORMAT_ENV).is_some_and(|format| format.eq_ignore_ascii_case("json"));

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console)
        .with(telemetry.map(|t| t.layer()))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let (telemetry, telemetry_error) = match TelemetryConfig::from_env(&process_env).map(|c| Telemetry::init(&c)) {
        Some(Ok(telemetry)) => (Some(telemetry), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    init_logging(args.debug, telemetry.as_ref());
    if let Some(e) = telemetry_error {
        tracing::warn!("Trace export disabled: {e}");
    }

    let result = cli::run(args).await;
    // Sends queued spans before exit
    drop(telemetry);
    result?;
    Ok(())
}
