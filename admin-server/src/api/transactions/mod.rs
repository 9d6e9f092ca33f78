//! Transaction API 模块 (只读)

use axum::{Json, Router, extract::State, routing::get};

use crate::core::ServerState;
use crate::db::models::Transaction;
use crate::db::repository::TransactionRepository;
use crate::utils::{AppResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/transactions", get(list))
}

/// GET /transactions - newest first
async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Transaction>>>> {
    let repo = TransactionRepository::new(state.get_db());
    Ok(ok(repo.find_all().await?))
}
