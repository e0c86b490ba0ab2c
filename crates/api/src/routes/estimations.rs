//! Estimation versioning routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::Actor};
use estimo_core::estimation::{CreateEstimationInput, EstimationError, EstimationStatus};

/// Creates the estimation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/estimations", post(create_estimation).get(list_estimations))
        .route("/estimations/approved", get(list_approved_estimations))
        .route("/estimations/{id}", get(get_estimation))
        .route("/estimations/{id}/status", put(update_estimation_status))
        .route(
            "/projects/{project_ref}/estimations",
            get(list_project_estimations),
        )
        .route(
            "/projects/{project_ref}/estimations/latest",
            get(get_latest_estimation),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating an estimation version.
#[derive(Debug, Deserialize)]
pub struct CreateEstimationRequest {
    /// Project id or code.
    pub project: String,
    /// Labor budget.
    #[serde(default)]
    pub labor_cost: Decimal,
    /// Material budget.
    #[serde(default)]
    pub material_cost: Decimal,
    /// Service and transport budget.
    #[serde(default)]
    pub service_cost: Decimal,
    /// Contingency and miscellaneous budget.
    #[serde(default)]
    pub contingency_cost: Decimal,
    /// Notes.
    pub notes: Option<String>,
}

/// Query parameters for listing estimations.
#[derive(Debug, Default, Deserialize)]
pub struct ListEstimationsQuery {
    /// Project id or code.
    pub project: Option<String>,
    /// Status filter.
    pub status: Option<String>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status: pending, approved, or rejected.
    pub status: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/estimations` - Create the next estimation version of a project.
async fn create_estimation(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateEstimationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let estimation = state
        .estimation_service()
        .create_or_update_estimate(CreateEstimationInput {
            project_ref: payload.project,
            labor_cost: payload.labor_cost,
            material_cost: payload.material_cost,
            service_cost: payload.service_cost,
            contingency_cost: payload.contingency_cost,
            notes: payload.notes,
            created_by: actor.user_id(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(estimation)))
}

/// GET `/estimations` - List estimations, optionally by project and status.
async fn list_estimations(
    State(state): State<AppState>,
    Query(query): Query<ListEstimationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| EstimationStatus::parse(s).ok_or_else(|| EstimationError::InvalidStatus(s.to_string())))
        .transpose()?;

    let service = state.estimation_service();
    let mut estimations = match query.project.as_deref() {
        Some(project_ref) => service.get_estimates_by_project(project_ref).await?,
        None => service.get_all_estimates().await?,
    };
    if let Some(status) = status {
        estimations.retain(|e| e.status == status);
    }

    Ok(Json(estimations))
}

/// GET `/estimations/approved` - List approved estimations.
async fn list_approved_estimations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let estimations = state.estimation_service().get_approved_estimates().await?;
    Ok(Json(estimations))
}

/// GET `/estimations/{id}` - Get one estimation.
async fn get_estimation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let estimation = state.estimation_service().get_estimate(id).await?;
    Ok(Json(estimation))
}

/// PUT `/estimations/{id}/status` - Approve, reject, or reset an estimation.
async fn update_estimation_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let estimation = state
        .estimation_service()
        .set_status(id, &payload.status)
        .await?;
    Ok(Json(estimation))
}

/// GET `/projects/{project_ref}/estimations` - All versions of a project.
async fn list_project_estimations(
    State(state): State<AppState>,
    Path(project_ref): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let estimations = state
        .estimation_service()
        .get_estimates_by_project(&project_ref)
        .await?;
    Ok(Json(estimations))
}

/// GET `/projects/{project_ref}/estimations/latest` - Highest version, or `null`.
async fn get_latest_estimation(
    State(state): State<AppState>,
    Path(project_ref): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let estimation = state
        .estimation_service()
        .get_latest_estimate(&project_ref)
        .await?;
    Ok(Json(estimation))
}
