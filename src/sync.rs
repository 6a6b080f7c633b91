use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tracing::info;

use crate::{
    options::{SourceOptions, StoreOptions},
    scheduler::Scheduler,
};

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    store: StoreOptions,

    #[command(flatten)]
    source: SourceOptions,
}

#[tokio::main]
pub async fn execute_command(cmd: &Command) -> Result<()> {
    let scheduler = Scheduler::new(
        cmd.source.client()?,
        cmd.store.open()?,
        cmd.source.batch_size,
        Duration::ZERO,
    )?;

    let added = scheduler.sync().await?;

    info!(%added, "synced");

    Ok(())
}
