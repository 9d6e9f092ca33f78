//! Report API 模块
//!
//! | 路径 | 说明 |
//! |------|------|
//! | /reports/accepted-orders?period=day\|week\|month | 按周期汇总已完成交易 |
//! | /reports/total-collection?period=... | 已完成交易总额 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/reports/accepted-orders", get(handler::accepted_orders))
        .route("/reports/total-collection", get(handler::total_collection))
}
