use anyhow::{Context, Result};
use clap::Args;
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio::signal;
use tracing::*;

use crate::{
    options::{SourceOptions, StoreOptions},
    scheduler::Scheduler,
};

mod handlers;
mod route;
mod state;

pub use route::{create_router, V1_PUBLIC};
pub use state::AppState;

#[derive(Debug, Args)]
pub struct Command {
    #[arg(long, env = "CFRSS_ADDR", default_value = "0.0.0.0:5000")]
    addr: SocketAddr,

    #[command(flatten)]
    store: StoreOptions,

    #[command(flatten)]
    source: SourceOptions,

    /// Poll Codeforces in the background while serving.
    #[arg(long, env = "CFRSS_ENABLE_SCHEDULER")]
    enable_scheduler: bool,

    #[arg(long, env = "CFRSS_COOLDOWN_MINUTES", default_value_t = 5)]
    cooldown_minutes: u64,

    /// Directory holding the built web client.
    #[arg(long, env = "CFRSS_ASSETS", default_value = "web/dist")]
    assets: PathBuf,
}

#[tokio::main]
pub async fn execute_command(cmd: &Command) -> Result<()> {
    let store = cmd.store.open()?;

    if cmd.enable_scheduler {
        let scheduler = Arc::new(Scheduler::new(
            cmd.source.client()?,
            store.clone(),
            cmd.source.batch_size,
            Duration::from_secs(cmd.cooldown_minutes * 60),
        )?);

        info!(cooldown_minutes = %cmd.cooldown_minutes, "scheduler:starting");

        tokio::task::spawn(scheduler.run());
    }

    let app_state = Arc::new(AppState::new(store));
    let app = create_router(cmd.assets.clone(), app_state);

    info!("listening on {}", cmd.addr);

    axum::Server::bind(&cmd.addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("hyper error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}
