use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
    },
    error::{reject, AppError},
    state::AppState,
    users::{repo_types::User, services},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();

    let user = services::register(
        state.users.as_ref(),
        &payload.username,
        &payload.password,
        &payload.repeated_password,
        &payload.name,
        &payload.surname,
    )
    .await
    .map_err(reject)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();

    let user = services::authenticate(state.users.as_ref(), &payload.username, &payload.password)
        .await
        .map_err(reject)?;

    let response = issue_tokens(&state, user)?;
    info!(username = %response.user.username, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        (StatusCode::UNAUTHORIZED, "Invalid refresh token".to_string())
    })?;

    // role is re-read so the new pair reflects the stored account
    let user = match services::load_by_username(state.users.as_ref(), &claims.sub).await {
        Ok(u) => u,
        Err(AppError::NotFound(_)) => {
            return Err((StatusCode::UNAUTHORIZED, "User not found".into()));
        }
        Err(e) => return Err(reject(e)),
    };

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = match services::load_by_username(state.users.as_ref(), &auth.username).await {
        Ok(u) => u,
        Err(AppError::NotFound(_)) => {
            warn!(username = %auth.username, "token for unknown user");
            return Err((StatusCode::UNAUTHORIZED, "User not found".into()));
        }
        Err(e) => return Err(reject(e)),
    };
    Ok(Json(user.into()))
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(&user.username, user.role).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    })?;
    let refresh_token = keys.sign_refresh(&user.username, user.role).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}
