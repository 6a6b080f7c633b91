use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::*;

use models::RecentAction;

pub const API_URL: &str = "https://codeforces.com/api";

const RECENT_ACTIONS: &str = "/recentActions";

const STATUS_OK: &str = "OK";

#[derive(thiserror::Error, Debug)]
pub enum CodeforcesError {
    #[error("http call to /recentActions failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode /recentActions response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("codeforces returned an error: {0}")]
    Api(String),
}

/// The slice of the Codeforces API we consume.
#[async_trait]
pub trait CodeforcesApi: Send + Sync {
    async fn recent_actions(&self, max_count: usize)
        -> Result<Vec<RecentAction>, CodeforcesError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T, CodeforcesError> {
        if self.status != STATUS_OK {
            return Err(CodeforcesError::Api(self.comment.unwrap_or(self.status)));
        }

        self.result
            .ok_or_else(|| CodeforcesError::Api("response is missing a result".to_owned()))
    }
}

fn decode_recent_actions(body: &str) -> Result<Vec<RecentAction>, CodeforcesError> {
    let envelope: Envelope<Vec<RecentAction>> = serde_json::from_str(body).map_err(|e| {
        debug!(%body, "recent-actions:body");
        e
    })?;

    envelope.into_result()
}

pub struct HttpCodeforcesClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCodeforcesClient {
    pub fn new(timeout: Duration) -> Result<Self, CodeforcesError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: API_URL.to_owned(),
        })
    }
}

#[async_trait]
impl CodeforcesApi for HttpCodeforcesClient {
    async fn recent_actions(
        &self,
        max_count: usize,
    ) -> Result<Vec<RecentAction>, CodeforcesError> {
        info!(%max_count, "recent-actions");

        let url = format!("{}{}", self.base_url, RECENT_ACTIONS);
        let body = self
            .client
            .get(&url)
            .query(&[("maxCount", max_count)])
            .send()
            .await?
            .text()
            .await?;

        decode_recent_actions(&body)
    }
}

/// Replays a recorded dataset, handing out the next `max_count` actions on
/// each call until it runs dry.
pub struct GoldenCodeforcesClient {
    dataset: Vec<RecentAction>,
    next: Mutex<usize>,
}

impl GoldenCodeforcesClient {
    pub fn new(dataset: Vec<RecentAction>) -> Self {
        Self {
            dataset,
            next: Mutex::new(0),
        }
    }

    /// Reads either a bare JSON array of actions or a saved API response.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let body = std::fs::read_to_string(path)?;
        let dataset = match serde_json::from_str::<Vec<RecentAction>>(&body) {
            Ok(dataset) => dataset,
            Err(_) => decode_recent_actions(&body)?,
        };

        info!(actions = %dataset.len(), path = %path.display(), "golden:loaded");

        Ok(Self::new(dataset))
    }
}

#[async_trait]
impl CodeforcesApi for GoldenCodeforcesClient {
    async fn recent_actions(
        &self,
        max_count: usize,
    ) -> Result<Vec<RecentAction>, CodeforcesError> {
        let mut next = self.next.lock();
        let start = (*next).min(self.dataset.len());
        let end = start.saturating_add(max_count).min(self.dataset.len());
        *next = end;

        Ok(self.dataset[start..end].to_vec())
    }
}
