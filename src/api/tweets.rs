//! Tweet Endpoints
//! Mission: Authenticated writes, public paginated reads

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::Tweet,
    store::StoreError,
    AppState,
};

const MAX_TWEET_LENGTH: usize = 1000;

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 100;

/// skip/limit pagination query
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Deserialize)]
pub struct TweetCreate {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TweetUpdate {
    pub content: String,
}

/// Trim and bound tweet content. Whitespace-only content is invalid.
fn validate_content(raw: &str) -> Result<&str, ApiError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ApiError::validation("Tweet content cannot be empty"));
    }
    if content.chars().count() > MAX_TWEET_LENGTH {
        return Err(ApiError::validation(format!(
            "Tweet content cannot exceed {MAX_TWEET_LENGTH} characters"
        )));
    }
    Ok(content)
}

/// Create - POST /tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<TweetCreate>,
) -> Result<(StatusCode, Json<Tweet>), ApiError> {
    let content = validate_content(&payload.content)?;

    let tweet = state.db.create_tweet(user.id, content)?;
    info!("✅ Tweet {} created by user {}", tweet.id, user.id);

    Ok((StatusCode::CREATED, Json(tweet)))
}

/// List - GET /tweets?skip&limit
///
/// Newest first. An empty page is a valid 200 `[]`, never an error.
pub async fn list_tweets(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Tweet>>, ApiError> {
    let tweets = state.db.list_tweets(page.skip(), page.limit())?;
    Ok(Json(tweets))
}

/// Followed-users feed - GET /tweets/feed?skip&limit
pub async fn feed(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Tweet>>, ApiError> {
    let tweets = state.db.list_feed(user.id, page.skip(), page.limit())?;
    Ok(Json(tweets))
}

/// Read - GET /tweets/:id
pub async fn get_tweet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Tweet>, ApiError> {
    let tweet = state
        .db
        .get_tweet(id)?
        .ok_or_else(|| ApiError::not_found("Tweet"))?;
    Ok(Json(tweet))
}

/// Update - PUT /tweets/:id (owner only)
pub async fn update_tweet(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TweetUpdate>,
) -> Result<Json<Tweet>, ApiError> {
    let content = validate_content(&payload.content)?;

    let tweet = state
        .db
        .update_tweet(id, user.id, content)
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Tweet"),
            e => e.into(),
        })?;

    Ok(Json(tweet))
}

/// Delete - DELETE /tweets/:id (owner only)
pub async fn delete_tweet(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_tweet(id, user.id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Tweet"),
        e => e.into(),
    })?;

    info!("🗑️  Tweet {} deleted by user {}", id, user.id);
    Ok(StatusCode::NO_CONTENT)
}
