//! Monthly report routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/monthly", get(get_monthly_report))
}

/// Query parameters for the monthly report.
#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    /// Calendar year.
    pub year: i32,
    /// Month, 1 through 12.
    pub month: u32,
}

/// GET `/reports/monthly` - Income, spend, variance, and alerts for one month.
async fn get_monthly_report(
    State(state): State<AppState>,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .report_service()
        .monthly_report(query.year, query.month)
        .await?;
    Ok(Json(report))
}
