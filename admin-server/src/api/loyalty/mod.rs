//! Loyalty API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /loyalty/update | POST | 手动记一次完成订单 |
//! | /rewards | GET | 所有会员记录 |
//! | /loyalty/activate/{id} | POST | 切换 active / not active |
//! | /loyalty/resetcount/{id} | POST | 订单数清零 (保留资格) |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/loyalty/update", post(handler::record_order))
        .route("/rewards", get(handler::list))
        .route("/loyalty/activate/{id}", post(handler::toggle_status))
        .route("/loyalty/resetcount/{id}", post(handler::reset_count))
}
