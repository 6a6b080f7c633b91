use async_trait::async_trait;
use reqwasm::http::Request;
use thiserror::Error;

use models::RecentAction;

use super::V1_PUBLIC;
use crate::{config::FeedConfig, types::FeedState};

const RECENT_ACTIONS: &str = "/user/activity/recent-actions";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("no subject to fetch activity for")]
    MissingSubject,
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait(?Send)]
pub trait ActivityFetcher {
    async fn fetch(
        &self,
        subject_id: &str,
        start_timestamp: &str,
    ) -> Result<Vec<RecentAction>, FetchError>;
}

pub fn recent_actions_url(subject_id: &str, start_timestamp: &str) -> String {
    format!(
        "{}{}?uuid={}&startTimestamp={}",
        V1_PUBLIC, RECENT_ACTIONS, subject_id, start_timestamp
    )
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HttpActivityFetcher {}

#[async_trait(?Send)]
impl ActivityFetcher for HttpActivityFetcher {
    async fn fetch(
        &self,
        subject_id: &str,
        start_timestamp: &str,
    ) -> Result<Vec<RecentAction>, FetchError> {
        if subject_id.is_empty() {
            return Err(FetchError::MissingSubject);
        }

        let url = recent_actions_url(subject_id, start_timestamp);

        log::debug!("fetch: {}", url);

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(serde_json::from_str(&body)?)
    }
}

/// One fetch. Failures are logged and leave the feed empty.
pub async fn load_feed(fetcher: &dyn ActivityFetcher, config: &FeedConfig) -> FeedState {
    if config.subject_id.is_empty() {
        log::error!("fetch: {}", FetchError::MissingSubject);
        return FeedState::default();
    }

    match fetcher
        .fetch(&config.subject_id, &config.start_timestamp)
        .await
    {
        Ok(records) => {
            log::info!("fetch: {} records", records.len());
            FeedState::from(records)
        }
        Err(e) => {
            log::error!("fetch: {}", e);
            FeedState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use std::cell::RefCell;

    use super::*;
    use crate::feed::tests::record;

    enum Canned {
        Records(Vec<RecentAction>),
        Unreachable,
        Body(&'static str),
    }

    struct FakeFetcher {
        canned: Canned,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl FakeFetcher {
        fn new(canned: Canned) -> Self {
            Self {
                canned,
                calls: Default::default(),
            }
        }
    }

    #[async_trait(?Send)]
    impl ActivityFetcher for FakeFetcher {
        async fn fetch(
            &self,
            subject_id: &str,
            start_timestamp: &str,
        ) -> Result<Vec<RecentAction>, FetchError> {
            self.calls
                .borrow_mut()
                .push((subject_id.to_owned(), start_timestamp.to_owned()));

            match &self.canned {
                Canned::Records(records) => Ok(records.clone()),
                Canned::Unreachable => Err(FetchError::Transport("unreachable".to_owned())),
                Canned::Body(body) => Ok(serde_json::from_str(body)?),
            }
        }
    }

    #[test]
    fn it_builds_the_feed_url() {
        assert_eq!(
            recent_actions_url("f84d38d4-a949-40fd-a3b2-12f3cdf563e2", "0"),
            "/api/v1/public/user/activity/recent-actions?uuid=f84d38d4-a949-40fd-a3b2-12f3cdf563e2&startTimestamp=0"
        );
    }

    #[test]
    fn it_fetches_once_with_the_configured_subject() {
        let fetcher = FakeFetcher::new(Canned::Records(vec![record(
            Some((1, "a", "T")),
            Some((2, "b", "<i>hello</i>")),
        )]));
        let config = FeedConfig::default();

        let feed = block_on(load_feed(&fetcher, &config));

        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.rows(&config)[0].identifier, "1_2");
        assert_eq!(
            *fetcher.calls.borrow(),
            vec![(config.subject_id.clone(), "0".to_owned())]
        );
    }

    #[test]
    fn it_renders_nothing_when_the_fetch_fails() {
        let fetcher = FakeFetcher::new(Canned::Unreachable);

        let feed = block_on(load_feed(&fetcher, &FeedConfig::default()));

        assert!(feed.is_empty());
    }

    #[test]
    fn it_renders_nothing_for_malformed_payloads() {
        let fetcher = FakeFetcher::new(Canned::Body(r#"{"status":"FAILED"}"#));

        let feed = block_on(load_feed(&fetcher, &FeedConfig::default()));

        assert!(feed.is_empty());
    }

    #[test]
    fn it_skips_the_fetch_without_a_subject() {
        let fetcher = FakeFetcher::new(Canned::Records(vec![record(
            Some((1, "a", "T")),
            Some((2, "b", "x")),
        )]));
        let config = FeedConfig::for_subject(String::new());

        let feed = block_on(load_feed(&fetcher, &config));

        assert!(feed.is_empty());
        assert!(fetcher.calls.borrow().is_empty());
    }

    #[test]
    fn it_cannot_tell_empty_from_failed() {
        let config = FeedConfig::default();
        let empty = block_on(load_feed(&FakeFetcher::new(Canned::Records(vec![])), &config));
        let failed = block_on(load_feed(&FakeFetcher::new(Canned::Unreachable), &config));

        assert_eq!(empty, failed);
        assert!(empty.rows(&config).is_empty());
    }
}
