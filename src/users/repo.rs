use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, User, UserRow};
use crate::error::AppError;

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Fails with [`AppError::UsernameExists`] when the username is taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, password_hash, name, surname, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let res = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, name, surname, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING username, password_hash, name, surname, role, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.role.as_str())
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(row) => Ok(User::try_from(row)?),
            // primary key on username is the authoritative uniqueness check
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::UsernameExists(user.username))
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert user").into()),
        }
    }
}
