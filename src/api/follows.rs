//! Follow Graph Endpoints
//! Mission: Follow/unfollow and public follower listings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::UserOut,
    store::StoreError,
    AppState,
};

/// Follow - POST /api/users/:id/follow
pub async fn follow_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(target_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if target_id == user.id {
        return Err(ApiError::validation("Cannot follow yourself"));
    }

    state.db.follow(user.id, target_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("User"),
        e => e.into(),
    })?;

    info!("➕ User {} now follows {}", user.id, target_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Unfollow - DELETE /api/users/:id/follow
pub async fn unfollow_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(target_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.unfollow(user.id, target_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Followers - GET /api/users/:id/followers
pub async fn list_followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserOut>>, ApiError> {
    let users = state.db.list_followers(user_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("User"),
        e => e.into(),
    })?;

    Ok(Json(users.iter().map(UserOut::from_user).collect()))
}

/// Following - GET /api/users/:id/following
pub async fn list_following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserOut>>, ApiError> {
    let users = state.db.list_following(user_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("User"),
        e => e.into(),
    })?;

    Ok(Json(users.iter().map(UserOut::from_user).collect()))
}
