use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::sleep};
use tracing::*;

use models::RecentAction;

use crate::{codeforces::CodeforcesApi, storage::CodeforcesStore};

/// Copies new recent actions from Codeforces into the store.
pub struct Scheduler {
    client: Arc<dyn CodeforcesApi>,
    store: Arc<dyn CodeforcesStore>,
    batch_size: usize,
    cooldown: Duration,
    last_inserted_timestamp: Mutex<i64>,
}

impl Scheduler {
    pub fn new(
        client: Arc<dyn CodeforcesApi>,
        store: Arc<dyn CodeforcesStore>,
        batch_size: usize,
        cooldown: Duration,
    ) -> Result<Self> {
        let last_inserted_timestamp = store
            .last_recorded_timestamp()
            .context("reading last recorded timestamp")?;

        Ok(Self {
            client,
            store,
            batch_size,
            cooldown,
            last_inserted_timestamp: Mutex::new(last_inserted_timestamp),
        })
    }

    pub async fn last_inserted_timestamp(&self) -> i64 {
        *self.last_inserted_timestamp.lock().await
    }

    /// One round trip to Codeforces. Returns how many actions were stored.
    pub async fn sync(&self) -> Result<usize> {
        let mut last = self.last_inserted_timestamp.lock().await;

        let actions = self
            .client
            .recent_actions(self.batch_size)
            .await
            .context("codeforces query failed")?;

        let (fresh, high_water) = filter_fresh(actions, *last);

        self.store
            .add_recent_actions(&fresh)
            .context("persisting recent actions failed")?;

        // Only advance once the insert has landed.
        *last = high_water;

        info!(timestamp = %high_water, added = %fresh.len(), "sync:persisted");

        Ok(fresh.len())
    }

    pub async fn run(self: Arc<Self>) {
        loop {
            if let Err(e) = self.sync().await {
                warn!("sync failed: {:?}", e);
            }

            debug!(cooldown = ?self.cooldown, "sync:sleeping");

            sleep(self.cooldown).await;
        }
    }
}

/// Drops actions at or before `last`, returning the rest and the new
/// high-water mark.
fn filter_fresh(actions: Vec<RecentAction>, last: i64) -> (Vec<RecentAction>, i64) {
    let high_water = actions
        .iter()
        .map(|action| action.time_seconds)
        .fold(last, i64::max);

    let fresh = actions
        .into_iter()
        .filter(|action| action.time_seconds > last)
        .collect();

    (fresh, high_water)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use models::{BlogEntry, Comment, User};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        codeforces::{CodeforcesError, GoldenCodeforcesClient},
        storage::{tests::action, MemoryStore, StoreError},
    };

    /// Always answers with the same batch.
    struct FixedCodeforces(Vec<RecentAction>);

    #[async_trait]
    impl CodeforcesApi for FixedCodeforces {
        async fn recent_actions(&self, _: usize) -> Result<Vec<RecentAction>, CodeforcesError> {
            Ok(self.0.clone())
        }
    }

    /// Rejects the first `failures` inserts, otherwise a `MemoryStore`.
    struct FailingStore {
        inner: MemoryStore,
        failures: AtomicUsize,
    }

    impl FailingStore {
        fn new(failures: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                failures: AtomicUsize::new(failures),
            }
        }
    }

    impl CodeforcesStore for FailingStore {
        fn add_recent_actions(&self, actions: &[RecentAction]) -> Result<(), StoreError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StoreError::Sqlite(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
                    None,
                )));
            }
            self.inner.add_recent_actions(actions)
        }

        fn query_recent_actions(
            &self,
            start_timestamp: i64,
            limit: usize,
        ) -> Result<Vec<RecentAction>, StoreError> {
            self.inner.query_recent_actions(start_timestamp, limit)
        }

        fn last_recorded_timestamp(&self) -> Result<i64, StoreError> {
            self.inner.last_recorded_timestamp()
        }

        fn query_all_unique_blogs(
            &self,
            start_timestamp: i64,
            limit: usize,
        ) -> Result<Vec<BlogEntry>, StoreError> {
            self.inner.query_all_unique_blogs(start_timestamp, limit)
        }

        fn query_comments_from_blog(
            &self,
            id: i64,
            start_timestamp: i64,
            limit: usize,
        ) -> Result<Vec<Comment>, StoreError> {
            self.inner.query_comments_from_blog(id, start_timestamp, limit)
        }

        fn add_user(&self, user: &User) -> Result<(), StoreError> {
            self.inner.add_user(user)
        }

        fn query_user_by_uuid(&self, uuid: &str) -> Result<User, StoreError> {
            self.inner.query_user_by_uuid(uuid)
        }

        fn query_recent_actions_for_user(
            &self,
            uuid: &str,
            start_timestamp: i64,
            limit: usize,
        ) -> Result<Vec<RecentAction>, StoreError> {
            self.inner
                .query_recent_actions_for_user(uuid, start_timestamp, limit)
        }

        fn subscribe_to_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError> {
            self.inner.subscribe_to_blogs(uuid, ids)
        }

        fn unsubscribe_from_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError> {
            self.inner.unsubscribe_from_blogs(uuid, ids)
        }
    }

    struct UnreachableCodeforces;

    #[async_trait]
    impl CodeforcesApi for UnreachableCodeforces {
        async fn recent_actions(&self, _: usize) -> Result<Vec<RecentAction>, CodeforcesError> {
            Err(CodeforcesError::Api("Call limit exceeded".to_owned()))
        }
    }

    #[test]
    fn it_filters_stale_actions() {
        let (fresh, high_water) = filter_fresh(
            vec![
                action(30, Some(1), Some(1)),
                action(10, Some(1), Some(2)),
                action(20, Some(1), Some(3)),
            ],
            20,
        );

        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].time_seconds, 30);
        assert_eq!(high_water, 30);
    }

    #[test]
    fn it_keeps_high_water_mark_when_nothing_is_new() {
        let (fresh, high_water) = filter_fresh(vec![action(10, Some(1), Some(1))], 20);

        assert!(fresh.is_empty());
        assert_eq!(high_water, 20);
    }

    #[tokio::test]
    async fn it_stores_each_action_once() -> Result<()> {
        let dataset: Vec<_> = (1..=250)
            .map(|i| action(i, Some(i % 7), Some(i)))
            .collect();
        let replayed = dataset.clone();
        let store = Arc::new(MemoryStore::new());
        let scheduler = Scheduler::new(
            Arc::new(GoldenCodeforcesClient::new(dataset)),
            store.clone(),
            100,
            Duration::from_secs(1),
        )?;

        let mut added = 0;
        for _ in 0..5 {
            added += scheduler.sync().await?;
        }

        assert_eq!(added, 250);
        assert_eq!(scheduler.last_inserted_timestamp().await, 250);
        assert_eq!(store.query_recent_actions(0, 1000)?.len(), 250);

        // Replaying the same data adds nothing.
        let again = Scheduler::new(
            Arc::new(GoldenCodeforcesClient::new(replayed)),
            store.clone(),
            100,
            Duration::from_secs(1),
        )?;
        assert_eq!(again.last_inserted_timestamp().await, 250);
        assert_eq!(again.sync().await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn it_holds_the_high_water_mark_on_failure() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        store.add_recent_actions(&[action(99, Some(1), Some(1))])?;

        let scheduler = Scheduler::new(
            Arc::new(UnreachableCodeforces),
            store,
            100,
            Duration::from_secs(1),
        )?;

        assert!(scheduler.sync().await.is_err());
        assert_eq!(scheduler.last_inserted_timestamp().await, 99);

        Ok(())
    }

    #[tokio::test]
    async fn it_retries_actions_the_store_rejected() -> Result<()> {
        let store = Arc::new(FailingStore::new(1));
        let batch = vec![action(10, Some(1), Some(1)), action(20, Some(1), Some(2))];

        let scheduler = Scheduler::new(
            Arc::new(FixedCodeforces(batch)),
            store.clone(),
            100,
            Duration::from_secs(1),
        )?;

        assert!(scheduler.sync().await.is_err());
        assert_eq!(scheduler.last_inserted_timestamp().await, 0);
        assert!(store.query_recent_actions(0, 100)?.is_empty());

        assert_eq!(scheduler.sync().await?, 2);
        assert_eq!(scheduler.last_inserted_timestamp().await, 20);
        assert_eq!(store.query_recent_actions(0, 100)?.len(), 2);

        assert_eq!(scheduler.sync().await?, 0);

        Ok(())
    }
}
