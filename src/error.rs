//! API Error Taxonomy
//! Mission: Translate every failure into one consistent HTTP error shape

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

/// Errors a handler can surface to a client.
///
/// Unauthorized is deliberately message-free: bad credentials, unknown
/// accounts, and expired/malformed tokens all collapse into the same
/// response so the API never acts as an account or token oracle.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("could not validate credentials")]
    Unauthorized,
    #[error("not allowed to modify this resource")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::Internal(ref cause) = self {
            // Cause stays server-side; the client only sees a generic body.
            error!("internal error: {cause:#}");
        }

        let body = Json(json!({ "detail": self.to_string() }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::not_found("Resource"),
            StoreError::NotOwner => ApiError::Forbidden,
            StoreError::Duplicate(field) => {
                ApiError::Conflict(format!("{field} already in use"))
            }
            StoreError::Sqlite(e) => ApiError::Internal(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::validation("empty content").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("Tweet").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("email already in use".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_carries_www_authenticate() {
        let resp = ApiError::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_store_error_translation() {
        let forbidden: ApiError = StoreError::NotOwner.into();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let conflict: ApiError = StoreError::Duplicate("email").into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let missing: ApiError = StoreError::NotFound.into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_body_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("connection pool exhausted"));
        assert_eq!(err.to_string(), "internal server error");
    }
}
