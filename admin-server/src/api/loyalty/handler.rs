//! Loyalty API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{LoyaltyRecord, LoyaltyUpdate};
use crate::utils::{AppResponse, AppResult, ok, ok_with_message};

pub async fn record_order(
    State(state): State<ServerState>,
    Json(payload): Json<LoyaltyUpdate>,
) -> AppResult<Json<AppResponse<LoyaltyRecord>>> {
    let record = state
        .loyalty
        .record_fulfilled_order(&payload.user_id, payload.user_name.trim())
        .await?;
    Ok(ok_with_message(record, "Loyalty updated"))
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<LoyaltyRecord>>>> {
    Ok(ok(state.loyalty.list().await?))
}

pub async fn toggle_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<LoyaltyRecord>>> {
    let record = state.loyalty.toggle_status(&id).await?;
    let message = format!("Loyalty status is now {}", record.status.as_str());
    Ok(ok_with_message(record, message))
}

pub async fn reset_count(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<LoyaltyRecord>>> {
    let record = state.loyalty.reset_count(&id).await?;
    Ok(ok_with_message(record, "Order count reset"))
}
