//! User Account Endpoints
//! Mission: Registration, login, and self-service profile management

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Form, Json,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::{
    auth::password::{hash_password, verify_password},
    auth::CurrentUser,
    error::ApiError,
    models::{User, UserOut},
    AppState,
};

const MIN_PASSWORD_LEN: usize = 8;
const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 100;

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// JSON login body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password-grant form body; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserOut,
}

/// Partial profile update; absent fields are untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("Regex should compile")
    })
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if !email_regex().is_match(email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    let len = name.trim().chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(ApiError::validation(format!(
            "Name must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_new_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Authenticate an email/password pair. Unknown email, wrong password, and
/// deactivated accounts all produce the same Unauthorized so login can't be
/// used to enumerate accounts. Hash-verification failures are internal
/// errors, never treated as a wrong password.
fn authenticate(state: &AppState, email: &str, password: &str) -> Result<User, ApiError> {
    let Some(user) = state.db.get_user_by_email(email)? else {
        warn!("❌ Failed login attempt: unknown email");
        return Err(ApiError::Unauthorized);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!("❌ Failed login attempt: {}", email);
        return Err(ApiError::Unauthorized);
    }

    if !user.is_active {
        warn!("❌ Login attempt on deactivated account: {}", email);
        return Err(ApiError::Unauthorized);
    }

    Ok(user)
}

fn login_response(state: &AppState, user: User) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = state.jwt.issue(&user.email)?;

    info!("✅ Login successful: {}", user.email);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: UserOut::from_user(&user),
    }))
}

/// Register - POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    validate_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_new_password(&payload.password)?;

    let password_hash = hash_password(&payload.password)?;

    // The store enforces email uniqueness; a concurrent registration that
    // wins the race surfaces as the same duplicate conflict.
    let user = state
        .db
        .create_user(payload.name.trim(), &payload.email, &password_hash)?;

    info!("✅ Registered user: {}", user.email);

    Ok((StatusCode::CREATED, Json(UserOut::from_user(&user))))
}

/// Login (OAuth2 form flavor) - POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = authenticate(&state, &form.username, &form.password)?;
    login_response(&state, user)
}

/// Login (JSON flavor) - POST /api/users/login-json
pub async fn login_json(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = authenticate(&state, &payload.email, &payload.password)?;
    login_response(&state, user)
}

/// Own profile - GET /api/users/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserOut> {
    Json(UserOut::from_user(&user))
}

/// Update own profile - PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserOut>, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        validate_name(name)?;
    }
    if let Some(email) = payload.email.as_deref() {
        validate_email(email)?;
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validate_new_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let updated = state.db.update_user(
        user.id,
        payload.name.as_deref().map(str::trim),
        payload.email.as_deref(),
        password_hash.as_deref(),
    )?;

    Ok(Json(UserOut::from_user(&updated)))
}

/// Change password - POST /api/users/change-password
///
/// Requires proof of the current password even though the caller already
/// holds a valid token.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if !verify_password(&payload.old_password, &user.password_hash)? {
        return Err(ApiError::validation("Wrong old password"));
    }
    validate_new_password(&payload.new_password)?;

    let password_hash = hash_password(&payload.new_password)?;
    state.db.set_password_hash(user.id, &password_hash)?;

    info!("🔐 Password changed for {}", user.email);

    Ok(StatusCode::OK)
}

/// Delete own account - DELETE /api/users/me
///
/// Cascades to the user's tweets, comments, and follow edges.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_user(user.id)?;
    info!("🗑️  Account deleted: {}", user.email);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last@sub.example.co").is_ok());

        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@domain").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@.com").is_err());
        assert!(validate_email("user with spaces@example.com").is_err());
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_name("Jo").is_ok());
        assert!(validate_name("Ana Maria").is_ok());

        assert!(validate_name("J").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_new_password("12345678").is_ok());
        assert!(validate_new_password("1234567").is_err());
    }
}
