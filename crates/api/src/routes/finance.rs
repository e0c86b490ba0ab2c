//! Finance summary routes.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Creates the finance summary routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/finance/summary", get(get_summary))
        .route("/finance/summary/balance", post(adjust_balance))
        .route("/finance/summary/income", post(adjust_income))
}

/// Request body for a balance adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustBalanceRequest {
    /// Signed delta.
    pub delta: Decimal,
}

/// Direction of an income adjustment.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeDirection {
    /// Add to income and balance.
    Increment,
    /// Subtract from income and balance.
    Decrement,
}

/// Request body for an income adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustIncomeRequest {
    /// Positive amount.
    pub amount: Decimal,
    /// Increment or decrement.
    pub direction: IncomeDirection,
}

/// GET `/finance/summary` - Current totals.
async fn get_summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let summary = state.finance_service().get_summary().await?;
    Ok(Json(summary))
}

/// POST `/finance/summary/balance` - Apply a signed balance delta.
async fn adjust_balance(
    State(state): State<AppState>,
    Json(payload): Json<AdjustBalanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.finance_service().adjust_balance(payload.delta).await?;
    Ok(Json(summary))
}

/// POST `/finance/summary/income` - Record approved or withdrawn income.
async fn adjust_income(
    State(state): State<AppState>,
    Json(payload): Json<AdjustIncomeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.finance_service();
    let summary = match payload.direction {
        IncomeDirection::Increment => service.increment_income(payload.amount).await?,
        IncomeDirection::Decrement => service.decrement_income(payload.amount).await?,
    };
    Ok(Json(summary))
}
