use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod codeforces;
mod options;
mod scheduler;
mod serve;
mod storage;
mod sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Environment {
    Dev,
    Prod,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Prod logs as JSON lines.
    #[arg(long, env = "CFRSS_ENVIRONMENT", value_enum, default_value_t = Environment::Dev)]
    environment: Environment,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Serve(serve::Command),
    Sync(sync::Command),
}

fn get_rust_log(verbose: u8) -> String {
    let level = if verbose > 0 { "debug" } else { "info" };
    let mut original = std::env::var("RUST_LOG").unwrap_or_else(|_| format!("cfrss={}", level));

    if !original.contains("tower_http=") {
        original.push_str(",tower_http=info");
    }

    original
}

fn main() -> Result<()> {
    color_backtrace::install();

    let cli = Cli::parse();

    let format = match cli.environment {
        Environment::Dev => tracing_subscriber::fmt::layer().boxed(),
        Environment::Prod => tracing_subscriber::fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(get_rust_log(cli.verbose)))
        .with(format)
        .init();

    info!("initialized, ready");

    debug!("debug enabled");

    match &cli.command {
        Some(Commands::Serve(cmd)) => serve::execute_command(cmd),
        Some(Commands::Sync(cmd)) => sync::execute_command(cmd),
        None => Ok(()),
    }
}
