//! Order API 模块
//!
//! 状态变更统一走 [`crate::orders::OrderLifecycle::transition`]

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::list).post(handler::create))
        .route("/orders/{id}", get(handler::get_by_id))
        .route("/orders/confirm/{id}", post(handler::change_status))
        .route("/orders/status/{id}", put(handler::change_status))
}
