use anyhow::{Context, Result};
use clap::Args;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;

use crate::{
    codeforces::{CodeforcesApi, GoldenCodeforcesClient, HttpCodeforcesClient},
    storage::{CodeforcesStore, MemoryStore, SqliteStore},
};

const MEMORY_STORE: &str = "memory";

#[derive(Debug, Args)]
pub struct StoreOptions {
    /// Path of the SQLite database, or `memory` to keep nothing.
    #[arg(long, env = "CFRSS_STORE", default_value = "cfrss.sqlite3")]
    pub store: String,
}

impl StoreOptions {
    pub fn open(&self) -> Result<Arc<dyn CodeforcesStore>> {
        if self.store == MEMORY_STORE {
            info!("store:memory");
            return Ok(Arc::new(MemoryStore::new()));
        }

        Ok(Arc::new(
            SqliteStore::open(&self.store)
                .with_context(|| format!("opening store {}", self.store))?,
        ))
    }
}

#[derive(Debug, Args)]
pub struct SourceOptions {
    /// Number of recent actions to ask Codeforces for on each call.
    #[arg(long, env = "CFRSS_BATCH_SIZE", default_value_t = 100)]
    pub batch_size: usize,

    #[arg(long, env = "CFRSS_CODEFORCES_TIMEOUT_MINUTES", default_value_t = 2)]
    pub codeforces_timeout_minutes: u64,

    /// Replay recorded actions from this file instead of calling Codeforces.
    #[arg(long, env = "CFRSS_GOLDEN", value_name = "FILE")]
    pub golden: Option<PathBuf>,
}

impl SourceOptions {
    pub fn client(&self) -> Result<Arc<dyn CodeforcesApi>> {
        match &self.golden {
            Some(path) => Ok(Arc::new(GoldenCodeforcesClient::from_file(path)?)),
            None => Ok(Arc::new(HttpCodeforcesClient::new(Duration::from_secs(
                self.codeforces_timeout_minutes * 60,
            ))?)),
        }
    }
}
