//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、令牌校验
//! - [`uploads`] - 上传图片访问
//! - [`items`] - 商品管理接口
//! - [`users`] - 顾客账号管理接口
//! - [`orders`] - 订单查询与状态变更
//! - [`transactions`] - 交易记录
//! - [`reports`] - 报表
//! - [`loyalty`] - 会员积分
//! - [`email`] - 手动发送邮件
//!
//! 公共路由与受保护路由分开构建，`require_auth` 只挂在受保护的一组上；
//! 未匹配的请求交给 SPA 静态文件。

pub mod form;

pub mod auth;
pub mod health;
pub mod uploads;

// Dashboard resources
pub mod email;
pub mod items;
pub mod loyalty;
pub mod orders;
pub mod reports;
pub mod transactions;
pub mod users;

use std::path::PathBuf;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};
use crate::services::image_store::MAX_FILE_SIZE;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Multipart overhead on top of the image itself
const FORM_OVERHEAD: usize = 64 * 1024;

/// Routes reachable without a token
pub fn public_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::public_router())
        .merge(uploads::router())
}

/// Routes behind `require_auth` (the layer is added in [`build_app`])
pub fn protected_router() -> Router<ServerState> {
    Router::new()
        .merge(auth::protected_router())
        .merge(items::router())
        .merge(users::router())
        .merge(orders::router())
        .merge(transactions::router())
        .merge(reports::router())
        .merge(loyalty::router())
        .merge(email::router())
}

/// Build the fully configured application
///
/// Used by [`crate::core::Server`] and by the HTTP tests.
pub fn build_app(state: ServerState) -> Router {
    health::mark_started();

    let protected = protected_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_auth,
    ));

    Router::new()
        .merge(public_router())
        .merge(protected)
        .fallback_service(spa_service(&state.config))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + FORM_OVERHEAD))
        .with_state(state.clone())
        // Tower HTTP 中间件
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
}

/// Static dashboard build; unknown paths get `index.html` (client-side routing)
fn spa_service(config: &Config) -> ServeDir<ServeFile> {
    let dir = PathBuf::from(&config.static_dir);
    ServeDir::new(&dir).fallback(ServeFile::new(dir.join("index.html")))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let Some(origin) = config.cors_origin.as_deref() else {
        return CorsLayer::permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!(origin = %origin, error = %e, "Invalid CORS_ORIGIN, allowing any origin");
            CorsLayer::permissive()
        }
    }
}
