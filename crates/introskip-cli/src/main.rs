mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use introskip_core::config::AppConfig;
use introskip_runtime::Runtime;

use crate::cli::{Cli, Command};

const DEFAULT_FILTER: &str = "introskip=info";

/// Install the subscriber: stderr always, plus a daily file when asked.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(to_file: bool) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file, guard) = if to_file {
        let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "introskip.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry().with(stderr).with(file).init();
    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_to_file = cli.log_file
        || AppConfig::load()
            .map(|c| c.general.log_to_file)
            .unwrap_or(false);
    let _guard = init_logging(log_to_file);
    tracing::debug!("introskip v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> commands::CommandResult {
    match command {
        Command::Extract(args) => commands::extract(&args),
        Command::Resolve(args) => commands::resolve(&runtime().await?, &args).await,
        Command::Submit(args) => commands::submit(&runtime().await?, &args).await,
        Command::Stats(args) => commands::stats(&runtime().await?, &args).await,
        Command::Key { action } => commands::key(&runtime().await?, &action).await,
        Command::Config { action } => commands::config(&action),
    }
}

async fn runtime() -> Result<Runtime, String> {
    Runtime::new().await.map_err(|e| e.to_string())
}
