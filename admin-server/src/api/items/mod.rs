//! Item API 模块
//!
//! 商品目录 CRUD，表单为 multipart (可带 `image` 文件)

mod handler;

use axum::{
    Router,
    routing::get,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/items", get(handler::list).post(handler::create))
        .route(
            "/items/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        // storefront listing, same data
        .route("/products", get(handler::list))
        .route("/items-by-category", get(handler::by_category))
}
