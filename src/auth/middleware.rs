//! Access Control Guard
//! Mission: Resolve bearer tokens to persisted users before handlers run

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{auth::jwt::TokenError, error::ApiError, models::User, AppState};

/// The authenticated user for the current request, inserted into request
/// extensions by [`auth_middleware`] and read by handlers via
/// `Extension<CurrentUser>`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Guard for protected routes: verify the bearer token, resolve its subject
/// to a user row, reject inactive accounts. Pure read; no mutation.
///
/// Every failure mode (missing header, malformed token, expired token,
/// unknown subject, deactivated account) produces the same 401 so the
/// response never distinguishes why.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.verify(&token).map_err(|e| {
        match e {
            TokenError::Expired => debug!("rejected expired token"),
            TokenError::Invalid => debug!("rejected malformed or forged token"),
        }
        ApiError::Unauthorized
    })?;

    let user = state
        .db
        .get_user_by_email(&claims.sub)
        .map_err(ApiError::from)?
        .ok_or(ApiError::Unauthorized)?;

    if !user.is_active {
        debug!("rejected token for deactivated account");
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri("/api/users/me");
        if let Some(v) = value {
            builder = builder.header("Authorization", v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        let req = request_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header() {
        let req = request_with_auth(None);
        assert!(bearer_token(&req).is_none());
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let req = request_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&req).is_none());
    }
}
