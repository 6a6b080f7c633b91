use parking_lot::Mutex;
use std::collections::HashMap;

use models::{BlogEntry, Comment, RecentAction, User};

use super::{comments_of, newest_first, unique_blogs, CodeforcesStore, StoreError};

#[derive(Default)]
struct Inner {
    recent_actions: Vec<RecentAction>,
    users: HashMap<String, User>,
}

impl Inner {
    fn user_mut(&mut self, uuid: &str) -> Result<&mut User, StoreError> {
        self.users
            .get_mut(uuid)
            .ok_or_else(|| StoreError::UnknownUser(uuid.to_owned()))
    }

    fn matching<F>(&self, start_timestamp: i64, predicate: F) -> Vec<RecentAction>
    where
        F: Fn(&RecentAction) -> bool,
    {
        self.recent_actions
            .iter()
            .filter(|action| action.time_seconds >= start_timestamp && predicate(action))
            .cloned()
            .collect()
    }
}

/// Keeps everything in process, used for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeforcesStore for MemoryStore {
    fn add_recent_actions(&self, actions: &[RecentAction]) -> Result<(), StoreError> {
        self.inner
            .lock()
            .recent_actions
            .extend(actions.iter().cloned());

        Ok(())
    }

    fn query_recent_actions(
        &self,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<RecentAction>, StoreError> {
        let found = self
            .inner
            .lock()
            .matching(start_timestamp, RecentAction::is_complete);

        Ok(newest_first(found, limit))
    }

    fn last_recorded_timestamp(&self) -> Result<i64, StoreError> {
        Ok(self
            .inner
            .lock()
            .recent_actions
            .iter()
            .map(|action| action.time_seconds)
            .max()
            .unwrap_or(0))
    }

    fn query_all_unique_blogs(
        &self,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<BlogEntry>, StoreError> {
        let all = self.inner.lock().recent_actions.clone();

        Ok(unique_blogs(
            newest_first(all, usize::MAX),
            start_timestamp,
            limit,
        ))
    }

    fn query_comments_from_blog(
        &self,
        id: i64,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError> {
        let found = self.inner.lock().matching(start_timestamp, |action| {
            action.comment.is_some() && action.blog_id() == Some(id)
        });

        Ok(comments_of(newest_first(found, limit)))
    }

    fn add_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.users.contains_key(&user.uuid) {
            return Err(StoreError::DuplicateUser(user.uuid.clone()));
        }

        inner.users.insert(user.uuid.clone(), user.clone());

        Ok(())
    }

    fn query_user_by_uuid(&self, uuid: &str) -> Result<User, StoreError> {
        self.inner
            .lock()
            .users
            .get(uuid)
            .cloned()
            .ok_or_else(|| StoreError::UnknownUser(uuid.to_owned()))
    }

    fn query_recent_actions_for_user(
        &self,
        uuid: &str,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<RecentAction>, StoreError> {
        let inner = self.inner.lock();
        let user = inner
            .users
            .get(uuid)
            .ok_or_else(|| StoreError::UnknownUser(uuid.to_owned()))?;

        let found = inner.matching(start_timestamp, |action| {
            action.is_complete()
                && action
                    .blog_id()
                    .map(|id| user.is_subscribed_to(id))
                    .unwrap_or(false)
        });

        Ok(newest_first(found, limit))
    }

    fn subscribe_to_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let user = inner.user_mut(uuid)?;
        for id in ids {
            if !user.subscribed_blogs.contains(id) {
                user.subscribed_blogs.push(*id);
            }
        }

        Ok(())
    }

    fn unsubscribe_from_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let user = inner.user_mut(uuid)?;
        user.subscribed_blogs.retain(|id| !ids.contains(id));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::storage::tests::exercise_store;

    #[test]
    fn it_behaves_like_a_store() -> Result<()> {
        exercise_store(&MemoryStore::new())
    }
}
