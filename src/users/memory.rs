use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo::UserStore;
use super::repo_types::{NewUser, User};
use crate::error::AppError;

/// Map-backed store keyed by username.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.username) {
            return Err(AppError::UsernameExists(user.username));
        }
        let created = User {
            username: user.username,
            password_hash: user.password_hash,
            name: user.name,
            surname: user.surname,
            role: user.role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(created.username.clone(), created.clone());
        Ok(created)
    }
}
