//! HTTP API Handlers
//! Mission: Validate input, call the store, translate outcomes to responses

pub mod comments;
pub mod follows;
pub mod tweets;
pub mod users;

use axum::Json;
use serde_json::{json, Value};

/// Liveness endpoint - GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
