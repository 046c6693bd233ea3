use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

/// Failures surfaced by the parking and user services.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} was not found")]
    NotFound(String),

    #[error("Invalid arguments")]
    InvalidArguments,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("User with username: {0} already exists")]
    UsernameExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArguments | AppError::PasswordMismatch => StatusCode::BAD_REQUEST,
            AppError::UsernameExists(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps a service failure onto the `(status, message)` pair handlers return.
pub fn reject(e: AppError) -> (StatusCode, String) {
    let status = e.status();
    if status.is_server_error() {
        error!(error = %e, "request failed");
        // store details stay in the log
        return (status, "Internal server error".into());
    }
    warn!(error = %e, %status, "request rejected");
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            AppError::NotFound("Parking".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::InvalidArguments.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PasswordMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UsernameExists("bob".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn reject_hides_internal_details() {
        let (status, msg) = reject(AppError::Internal(anyhow::anyhow!("pool timed out")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!msg.contains("pool"));

        let (status, msg) = reject(AppError::UsernameExists("bob".into()));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(msg, "User with username: bob already exists");
    }
}
