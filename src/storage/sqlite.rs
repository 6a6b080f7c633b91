use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension};
use tracing::*;

use models::{BlogEntry, Comment, RecentAction, User};

use super::{comments_of, newest_first, unique_blogs, CodeforcesStore, StoreError};

const MEMORY_SPECIAL: &str = ":memory:";

enum SetupQuery {
    Execute(&'static str),
    Query(&'static str),
}

trait Migrate {
    fn migrate(&self) -> Result<(), StoreError>;
}

impl Migrate for Connection {
    fn migrate(&self) -> Result<(), StoreError> {
        let exec = |query: SetupQuery| -> Result<(), StoreError> {
            match query {
                SetupQuery::Execute(sql) => {
                    let mut stmt = self.prepare(sql)?;
                    stmt.execute([])?;
                }
                SetupQuery::Query(sql) => {
                    let mut stmt = self.prepare(sql)?;
                    let _ = stmt.query([])?;
                }
            };
            Ok(())
        };

        exec(SetupQuery::Query("PRAGMA journal_mode = WAL"))?;

        exec(SetupQuery::Execute(
            r#"
                CREATE TABLE IF NOT EXISTS recent_actions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    time_seconds INTEGER NOT NULL,
                    blog_id INTEGER,
                    comment_id INTEGER,
                    serialized TEXT NOT NULL
                )"#,
        ))?;

        exec(SetupQuery::Execute(
            r#"CREATE INDEX IF NOT EXISTS recent_actions_time ON recent_actions (time_seconds)"#,
        ))?;

        exec(SetupQuery::Execute(
            r#"
                CREATE TABLE IF NOT EXISTS users (
                    uuid TEXT NOT NULL PRIMARY KEY,
                    username TEXT NOT NULL,
                    hashed_password TEXT NOT NULL,
                    email TEXT,
                    codeforces_handle TEXT
                )"#,
        ))?;

        exec(SetupQuery::Execute(
            r#"
                CREATE TABLE IF NOT EXISTS subscriptions (
                    uuid TEXT NOT NULL,
                    blog_id INTEGER NOT NULL,
                    PRIMARY KEY (uuid, blog_id)
                )"#,
        ))?;

        Ok(())
    }
}

/// Recent actions are kept as serialized JSON alongside the columns queries
/// filter on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = if path == MEMORY_SPECIAL {
            Connection::open_in_memory()?
        } else {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE,
            )?
        };

        conn.migrate()?;

        info!(%path, "sqlite:opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn actions_query<P: rusqlite::Params>(
        &self,
        query: &str,
        params: P,
    ) -> Result<Vec<RecentAction>, StoreError> {
        trace!("querying");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(query)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;

        let mut actions = Vec::new();
        for serialized in rows {
            actions.push(serde_json::from_str(&serialized?)?);
        }

        Ok(actions)
    }

    fn require_user(conn: &Connection, uuid: &str) -> Result<(), StoreError> {
        let found: Option<String> = conn
            .query_row("SELECT uuid FROM users WHERE uuid = ?1", (uuid,), |row| {
                row.get(0)
            })
            .optional()?;

        match found {
            Some(_) => Ok(()),
            None => Err(StoreError::UnknownUser(uuid.to_owned())),
        }
    }
}

impl CodeforcesStore for SqliteStore {
    fn add_recent_actions(&self, actions: &[RecentAction]) -> Result<(), StoreError> {
        if actions.is_empty() {
            return Ok(());
        }

        debug!(actions = %actions.len(), "persisting");

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO recent_actions (time_seconds, blog_id, comment_id, serialized) VALUES (?1, ?2, ?3, ?4)",
            )?;

            for action in actions {
                stmt.execute((
                    action.time_seconds,
                    action.blog_id(),
                    action.comment.as_ref().map(|c| c.id),
                    serde_json::to_string(action)?,
                ))?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn query_recent_actions(
        &self,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<RecentAction>, StoreError> {
        let actions = self.actions_query(
            r#"SELECT serialized FROM recent_actions
               WHERE time_seconds >= ?1 AND blog_id IS NOT NULL AND comment_id IS NOT NULL
               ORDER BY time_seconds DESC, id ASC LIMIT ?2"#,
            (start_timestamp, limit as i64),
        )?;

        Ok(newest_first(actions, limit))
    }

    fn last_recorded_timestamp(&self) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        let max: i64 = conn.query_row(
            "SELECT COALESCE(MAX(time_seconds), 0) FROM recent_actions",
            [],
            |row| row.get(0),
        )?;

        Ok(max)
    }

    fn query_all_unique_blogs(
        &self,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<BlogEntry>, StoreError> {
        let actions = self.actions_query(
            r#"SELECT serialized FROM recent_actions
               WHERE blog_id IS NOT NULL
               ORDER BY time_seconds DESC, id ASC"#,
            [],
        )?;

        Ok(unique_blogs(actions, start_timestamp, limit))
    }

    fn query_comments_from_blog(
        &self,
        id: i64,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError> {
        let actions = self.actions_query(
            r#"SELECT serialized FROM recent_actions
               WHERE time_seconds >= ?1 AND blog_id = ?2 AND comment_id IS NOT NULL
               ORDER BY time_seconds DESC, id ASC LIMIT ?3"#,
            (start_timestamp, id, limit as i64),
        )?;

        Ok(comments_of(newest_first(actions, limit)))
    }

    fn add_user(&self, user: &User) -> Result<(), StoreError> {
        info!(username = %user.username, uuid = %user.uuid, "adding user");

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO users (uuid, username, hashed_password, email, codeforces_handle) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &user.uuid,
                &user.username,
                &user.hashed_password,
                &user.email,
                &user.codeforces_handle,
            ),
        );

        match inserted {
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StoreError::DuplicateUser(user.uuid.clone()))
            }
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }

        for id in &user.subscribed_blogs {
            tx.execute(
                "INSERT OR IGNORE INTO subscriptions (uuid, blog_id) VALUES (?1, ?2)",
                (&user.uuid, id),
            )?;
        }

        tx.commit()?;

        Ok(())
    }

    fn query_user_by_uuid(&self, uuid: &str) -> Result<User, StoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT uuid, username, hashed_password, email, codeforces_handle FROM users WHERE uuid = ?1",
                (uuid,),
                |row| {
                    Ok(User {
                        uuid: row.get(0)?,
                        username: row.get(1)?,
                        hashed_password: row.get(2)?,
                        email: row.get(3)?,
                        codeforces_handle: row.get(4)?,
                        subscribed_blogs: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut user) = user else {
            return Err(StoreError::UnknownUser(uuid.to_owned()));
        };

        let mut stmt =
            conn.prepare("SELECT blog_id FROM subscriptions WHERE uuid = ?1 ORDER BY rowid")?;
        let ids = stmt.query_map((uuid,), |row| row.get::<_, i64>(0))?;
        for id in ids {
            user.subscribed_blogs.push(id?);
        }

        Ok(user)
    }

    fn query_recent_actions_for_user(
        &self,
        uuid: &str,
        start_timestamp: i64,
        limit: usize,
    ) -> Result<Vec<RecentAction>, StoreError> {
        Self::require_user(&self.conn.lock(), uuid)?;

        let actions = self.actions_query(
            r#"SELECT serialized FROM recent_actions
               WHERE time_seconds >= ?1 AND comment_id IS NOT NULL
                 AND blog_id IN (SELECT blog_id FROM subscriptions WHERE uuid = ?2)
               ORDER BY time_seconds DESC, id ASC LIMIT ?3"#,
            (start_timestamp, uuid, limit as i64),
        )?;

        Ok(newest_first(actions, limit))
    }

    fn subscribe_to_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError> {
        info!(%uuid, ?ids, "subscribing");

        let mut conn = self.conn.lock();
        Self::require_user(&conn, uuid)?;

        let tx = conn.transaction()?;
        for id in ids {
            tx.execute(
                "INSERT OR IGNORE INTO subscriptions (uuid, blog_id) VALUES (?1, ?2)",
                (uuid, id),
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    fn unsubscribe_from_blogs(&self, uuid: &str, ids: &[i64]) -> Result<(), StoreError> {
        info!(%uuid, ?ids, "unsubscribing");

        let mut conn = self.conn.lock();
        Self::require_user(&conn, uuid)?;

        let tx = conn.transaction()?;
        for id in ids {
            let affected = tx.execute(
                "DELETE FROM subscriptions WHERE uuid = ?1 AND blog_id = ?2",
                (uuid, id),
            )?;
            if affected == 0 {
                warn!(%uuid, %id, "unsubscribe:noop");
            }
        }
        tx.commit()?;

        Ok(())
    }
}
