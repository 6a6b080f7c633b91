use std::collections::HashSet;

use models::{BlogEntry, Comment, RecentAction, User};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("user {0} does not exist")]
    UnknownUser(String),
    #[error("user {0} already exists")]
    DuplicateUser(String),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for recent actions pulled from Codeforces and the users
/// subscribed to them. Queries return newest activity first.
pub trait CodeforcesStore: Send + Sync {
    /// Appends a batch of actions.
    fn add_recent_actions(&self, actions: &[RecentAction]) -> Result<(), StoreError>;

    /// Actions at or after `start_timestamp` that carry both a blog entry and
    /// a comment.
    fn query_recent_actions(
        &self,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<RecentAction>, StoreError>;

    /// Latest activity timestamp of anything stored, zero when empty.
    fn last_recorded_timestamp(&self) -> Result<i64, StoreError>;

    /// Distinct blog entries created at or after `start_timestamp`, ordered by
    /// their most recent activity.
    fn query_all_unique_blogs(
        &self,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<BlogEntry>, StoreError>;

    fn query_comments_from_blog(
        &self,
        id: i64,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError>;

    fn add_user(&self, user: &User) -> Result<(), StoreError>;

    fn query_user_by_uuid(&self, uuid: &str) -> Result<User, StoreError>;

    /// Like `query_recent_actions`, restricted to the blogs the user follows.
    fn query_recent_actions_for_user(
        &self,
        uuid: &str,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<RecentAction>, StoreError>;

    fn subscribe_to_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError>;

    fn unsubscribe_from_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError>;
}

/// Sorts newest first, keeping insertion order among ties, then truncates and
/// rewrites relative links.
fn newest_first(mut actions: Vec<RecentAction>, limit: usize) -> Vec<RecentAction> {
    actions.sort_by(|a, b| b.time_seconds.cmp(&a.time_seconds));
    actions.truncate(limit);
    for action in actions.iter_mut() {
        action.absolutize_links();
    }
    actions
}

/// Expects `actions` newest first.
fn unique_blogs(
    actions: impl IntoIterator<Item = RecentAction>,
    start_timestamp: i64,
    limit: usize,
) -> Vec<BlogEntry> {
    let mut seen = HashSet::new();
    actions
        .into_iter()
        .filter_map(|action| action.blog_entry)
        .filter(|blog| blog.creation_time_seconds >= start_timestamp)
        .filter(|blog| seen.insert(blog.id))
        .take(limit)
        .collect()
}

fn comments_of(actions: Vec<RecentAction>) -> Vec<Comment> {
    actions
        .into_iter()
        .filter_map(|action| action.comment)
        .collect()
}
