//! CLI entry point for aic.

mod cli;

use std::io::IsTerminal;
use std::process::ExitCode;

use aic::api::ApiClient;
use aic::build_info;
use aic::config::{env::LOG_ENV, load_settings, ConfigLocation, Settings};
use aic::model::LocalModel;
use aic::repl::{self, RunOutcome};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let _args = cli::Args::parse();
    init_logging();
    tracing::debug!("{}", build_info::summary_line());

    let location = ConfigLocation::resolve();
    if location.is_none() {
        tracing::warn!("home directory is unknown; instructions will not be persisted");
    }

    let settings = match load_settings(location.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("warning: {e}; using default model settings");
            Settings::default()
        }
    };
    tracing::debug!(
        base_url = %settings.model.base_url,
        model = %settings.model.model,
        "model settings resolved"
    );

    let client = ApiClient::new(&settings.model);
    let model = LocalModel::new(client, &settings.model.base_url);
    let stdin = BufReader::new(tokio::io::stdin());

    match repl::run(&model, location.as_ref(), stdin, std::io::stdout()).await {
        Ok(RunOutcome::ModelUnavailable) => ExitCode::FAILURE,
        Ok(RunOutcome::Exited | RunOutcome::EndOfInput) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so stdout carries only the conversation.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}
