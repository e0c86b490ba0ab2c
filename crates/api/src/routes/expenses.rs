//! Expense and budget health routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::Actor};
use estimo_core::spend::{CorrectExpenseInput, RecordExpenseInput};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(record_expense))
        .route("/expenses/{id}", get(get_expense).patch(correct_expense))
        .route(
            "/projects/{project_ref}/budget-health",
            get(get_budget_health),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for recording an expense.
#[derive(Debug, Deserialize)]
pub struct RecordExpenseRequest {
    /// Project id or code.
    pub project: String,
    /// One of labor, material, service, contingency.
    pub category: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Proof document.
    pub proof_url: Option<String>,
}

/// Query parameters for listing expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ListExpensesQuery {
    /// Project id or code.
    pub project: Option<String>,
    /// Category filter.
    pub category: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/expenses` - Record an expense and evaluate the budget threshold.
///
/// The response carries the stored expense and the threshold evaluation.
async fn record_expense(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<RecordExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recorded = state
        .spend_service()
        .record_expense(RecordExpenseInput {
            project_ref: payload.project,
            category: payload.category,
            amount: payload.amount,
            description: payload.description,
            created_by: actor.user_id(),
            proof_url: payload.proof_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(recorded)))
}

/// GET `/expenses` - List expenses.
async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListExpensesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let expenses = state
        .spend_service()
        .list_expenses(query.project.as_deref(), query.category.as_deref())
        .await?;
    Ok(Json(expenses))
}

/// GET `/expenses/{id}` - Get one expense.
async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = state.spend_service().get_expense(id).await?;
    Ok(Json(expense))
}

/// PATCH `/expenses/{id}` - Correct amount, description, or proof.
///
/// A correction can change a month that already has a cached report, so the
/// report cache is dropped on success.
async fn correct_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CorrectExpenseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = state.spend_service().correct_expense(id, payload).await?;
    state.report_service().invalidate_cache();
    Ok(Json(expense))
}

/// GET `/projects/{project_ref}/budget-health` - Spend against the latest estimation.
async fn get_budget_health(
    State(state): State<AppState>,
    Path(project_ref): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let health = state.spend_service().get_budget_health(&project_ref).await?;
    Ok(Json(health))
}
