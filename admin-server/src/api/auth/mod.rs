//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Public authentication routes
/// - /register: only when `ALLOW_REGISTRATION` is on
/// - /login: captcha + name/email + password
/// - /logout, /verifyToken: stateless
pub fn public_router() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/verifyToken", post(handler::verify_token))
}

/// Routes that need a valid token
pub fn protected_router() -> Router<ServerState> {
    Router::new().route("/protected", get(handler::protected))
}
