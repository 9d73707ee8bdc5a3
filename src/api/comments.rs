//! Comment Endpoints
//! Mission: Nested create/list under an existing tweet

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::Comment,
    store::StoreError,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CommentCreate {
    pub text: String,
}

/// Create - POST /tweets/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(tweet_id): Path<i64>,
    Json(payload): Json<CommentCreate>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::validation("Comment cannot be empty"));
    }

    let comment = state
        .db
        .create_comment(tweet_id, user.id, text)
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Tweet"),
            e => e.into(),
        })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List - GET /tweets/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(tweet_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = state.db.list_comments(tweet_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Tweet"),
        e => e.into(),
    })?;

    Ok(Json(comments))
}
