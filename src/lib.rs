//! Chirp Backend Library
//!
//! REST backend for a minimal social network: accounts with password
//! login, signed bearer tokens, tweets, comments, and a follow graph
//! over SQLite. Exposed as a library so the binary and the integration
//! tests drive the same router.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::auth::{auth_middleware, JwtHandler};
use crate::store::Db;

/// Application state shared across all requests. Everything in here is
/// immutable after startup; the database serializes its own access.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub jwt: Arc<JwtHandler>,
}

/// Build the full application router.
///
/// Public routes and protected routes are separate routers merged at the
/// end; the protected set carries the access-control guard as a route
/// layer so no handler behind it can run without a resolved user.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(api::health))
        .route("/api/users/register", post(api::users::register))
        .route("/api/users/login", post(api::users::login))
        .route("/api/users/login-json", post(api::users::login_json))
        .route("/api/users/:id/followers", get(api::follows::list_followers))
        .route("/api/users/:id/following", get(api::follows::list_following))
        .route("/tweets", get(api::tweets::list_tweets))
        .route("/tweets/:id", get(api::tweets::get_tweet))
        .route("/tweets/:id/comments", get(api::comments::list_comments))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            "/api/users/me",
            get(api::users::me)
                .put(api::users::update_me)
                .delete(api::users::delete_me),
        )
        .route("/api/users/change-password", post(api::users::change_password))
        .route(
            "/api/users/:id/follow",
            post(api::follows::follow_user).delete(api::follows::unfollow_user),
        )
        .route("/tweets", post(api::tweets::create_tweet))
        .route("/tweets/feed", get(api::tweets::feed))
        .route(
            "/tweets/:id",
            put(api::tweets::update_tweet).delete(api::tweets::delete_tweet),
        )
        .route("/tweets/:id/comments", post(api::comments::create_comment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
