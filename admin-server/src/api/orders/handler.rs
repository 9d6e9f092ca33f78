//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{LoyaltyRecord, Order, OrderCreate, OrderStatusUpdate, Transaction};
use crate::db::repository::OrderRepository;
use crate::orders::TransitionOutcome;
use crate::utils::validation::{MAX_NAME_LEN, validate_amount, validate_email, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// Status change response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub order: Order,
    pub previous_status: String,
    pub fulfilled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<LoyaltyRecord>,
}

impl From<TransitionOutcome> for StatusChangeResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            fulfilled: outcome.fulfilled(),
            previous_status: outcome.previous.as_str().to_string(),
            order: outcome.order,
            transaction: outcome.transaction,
            loyalty: outcome.loyalty,
        }
    }
}

/// GET /orders - newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let repo = OrderRepository::new(state.get_db());
    Ok(ok(repo.find_all().await?))
}

/// GET /orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(ok(order))
}

/// POST /orders - record an order taken outside the storefront
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<Order>>)> {
    validate_required_text(&payload.user_name, "userName", MAX_NAME_LEN)?;
    validate_email(&payload.user_email, "userEmail")?;
    validate_amount(payload.total_amount, "totalAmount")?;
    for item in &payload.cart_items {
        validate_amount(item.price, "cartItems.price")?;
    }

    let repo = OrderRepository::new(state.get_db());
    let order = repo.create(payload).await?;
    Ok((StatusCode::CREATED, ok_with_message(order, "Order created")))
}

/// POST /orders/confirm/:id and PUT /orders/status/:id
///
/// Both paths run the same transition, including the fulfillment side effects.
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<AppResponse<StatusChangeResponse>>> {
    let outcome = state.lifecycle.transition(&id, &payload.status).await?;
    let message = format!("Order status updated to {}", outcome.order.status);
    Ok(ok_with_message(StatusChangeResponse::from(outcome), message))
}
