use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Capability attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Row as stored in `users`; the role column is plain text.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub role: String,
    pub created_at: OffsetDateTime,
}

/// User account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub username: String,             // unique, acts as the identifier
    #[serde(skip_serializing)]
    pub password_hash: String,        // argon2 PHC string
    pub name: String,
    pub surname: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: r.role.parse()?,
            username: r.username,
            password_hash: r.password_hash,
            name: r.name,
            surname: r.surname,
            created_at: r.created_at,
        })
    }
}

/// Fields needed to create an account; the store fills in `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub role: Role,
}
