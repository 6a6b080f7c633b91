use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::*;

use models::User;

use crate::storage::CodeforcesStore;

pub struct AppState {
    pub store: Arc<dyn CodeforcesStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CodeforcesStore>) -> Self {
        Self { store }
    }

    pub fn register_user(&self, username: &str, password: &str) -> Result<User> {
        if username.is_empty() || password.is_empty() {
            return Err(anyhow!("username and password are required"));
        }

        use argon2::{
            password_hash::{rand_core::OsRng, SaltString},
            Argon2, PasswordHasher,
        };

        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("hashing password failed: {}", e))?;

        let user = User {
            uuid: uuid::Uuid::new_v4().to_string(),
            username: username.to_owned(),
            hashed_password,
            ..Default::default()
        };

        self.store.add_user(&user)?;

        info!(uuid = %user.uuid, "registered!");

        Ok(user)
    }
}
