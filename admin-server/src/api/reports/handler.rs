//! Report API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::reports::{ReportBucket, ReportPeriod, TotalCollection};
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> AppResult<ReportPeriod> {
        self.period
            .as_deref()
            .ok_or_else(|| AppError::validation("period is required"))?
            .parse()
    }
}

/// GET /reports/accepted-orders
pub async fn accepted_orders(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<AppResponse<Vec<ReportBucket>>>> {
    let period = query.period()?;
    Ok(ok(state.reports.accepted_orders(period).await?))
}

/// GET /reports/total-collection
pub async fn total_collection(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<AppResponse<TotalCollection>>> {
    let period = query.period()?;
    Ok(ok(state.reports.total_collection(period).await?))
}
