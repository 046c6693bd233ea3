use tracing::{info, warn};

use super::repo::UserStore;
use super::repo_types::{NewUser, Role, User};
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;

/// Creates a `USER` account.
///
/// Checks run in order and the first failure is returned: any empty input,
/// then mismatching passwords, then a taken username.
pub async fn register(
    store: &dyn UserStore,
    username: &str,
    password: &str,
    repeated_password: &str,
    name: &str,
    surname: &str,
) -> Result<User, AppError> {
    if [username, password, repeated_password, name, surname]
        .iter()
        .any(|s| s.is_empty())
    {
        return Err(AppError::InvalidArguments);
    }
    if password != repeated_password {
        return Err(AppError::PasswordMismatch);
    }
    if store.find_by_username(username).await?.is_some() {
        return Err(AppError::UsernameExists(username.to_string()));
    }

    let password_hash = hash_password(password)?;
    let user = store
        .insert(NewUser {
            username: username.to_string(),
            password_hash,
            name: name.to_string(),
            surname: surname.to_string(),
            role: Role::User,
        })
        .await?;

    info!(username = %user.username, "user registered");
    Ok(user)
}

pub async fn load_by_username(store: &dyn UserStore, username: &str) -> Result<User, AppError> {
    store
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {username}")))
}

/// Loads the account and checks its password. Unknown users and wrong
/// passwords fail the same way.
pub async fn authenticate(
    store: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = match load_by_username(store, username).await {
        Ok(u) => u,
        Err(AppError::NotFound(_)) => {
            warn!(%username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e),
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(%username, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}

/// Creates the configured administrator if the username is still free.
pub async fn ensure_admin(
    store: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<(), AppError> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::InvalidArguments);
    }
    if let Some(existing) = store.find_by_username(username).await? {
        if existing.role != Role::Admin {
            warn!(%username, role = %existing.role, "configured admin exists without ADMIN role");
        }
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    let admin = NewUser {
        username: username.to_string(),
        password_hash,
        name: "Administrator".into(),
        surname: String::new(),
        role: Role::Admin,
    };
    match store.insert(admin).await {
        Ok(_) => {
            info!(%username, "admin account created");
            Ok(())
        }
        // another instance won the race
        Err(AppError::UsernameExists(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
