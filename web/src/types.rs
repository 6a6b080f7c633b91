use models::{profile_url, RecentAction};

use crate::{
    config::FeedConfig,
    feed::{extract_comment, extract_comment_link, get_identifier},
    markup::{html_to_text, render_comment_markup},
};

/// The most recent fetch, in the order the server returned it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedState {
    pub records: Vec<RecentAction>,
}

impl From<Vec<RecentAction>> for FeedState {
    fn from(records: Vec<RecentAction>) -> Self {
        Self { records }
    }
}

impl FeedState {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self, config: &FeedConfig) -> Vec<ActivityRow> {
        self.records
            .iter()
            .enumerate()
            .map(|(position, record)| ActivityRow::new(position, record, config))
            .collect()
    }
}

/// Display fields for one feed row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityRow {
    /// Unique within a feed, falls back to the position when `identifier` is empty.
    pub key: String,
    pub identifier: String,
    pub commentator_handle: String,
    pub commentator_url: String,
    pub avatar_url: String,
    pub author_handle: String,
    pub author_url: String,
    pub comment_link: Option<String>,
    pub title: String,
    pub body: String,
}

impl ActivityRow {
    pub fn new(position: usize, record: &RecentAction, config: &FeedConfig) -> Self {
        let identifier = get_identifier(record);
        let key = if identifier.is_empty() {
            format!("position-{}", position)
        } else {
            identifier.clone()
        };

        let commentator_handle = record
            .comment
            .as_ref()
            .map(|c| c.commentator_handle.clone())
            .unwrap_or_default();
        let (author_handle, title) = record
            .blog_entry
            .as_ref()
            .map(|b| (b.author_handle.clone(), html_to_text(&b.title)))
            .unwrap_or_default();

        Self {
            key,
            identifier,
            commentator_url: profile_url(&commentator_handle),
            commentator_handle,
            avatar_url: config.avatar.resolve(record),
            author_url: profile_url(&author_handle),
            author_handle,
            comment_link: extract_comment_link(record),
            title,
            body: render_comment_markup(config.markup, extract_comment(record)),
        }
    }
}
