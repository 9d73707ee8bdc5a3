//! Core Domain Models
//! Mission: Define the persisted entities and their sanitized projections

use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub is_active: bool,
    pub created_at: String,
}

/// User profile as exposed over the API (no credential material)
#[derive(Debug, Clone, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl UserOut {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// A tweet owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: i64,
    pub content: String,
    pub owner_id: i64,
    pub created_at: String,
}

/// A comment on a tweet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub tweet_id: i64,
    pub user_id: i64,
    pub created_at: String,
}
