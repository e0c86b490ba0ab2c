//! Quotation routes.
//!
//! Quotations are versioned per `(project, estimate_version)`. Revising
//! appends a new row; updating edits an unlocked row in place; locking is
//! terminal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::Actor};
use estimo_core::quotation::{
    CreateQuotationInput, QuotationContentInput, QuotationError, QuotationFilter, QuotationItems,
    QuotationStatus,
};
use estimo_shared::types::PageRequest;

/// Creates the quotation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotations", post(create_quotation).get(list_quotations))
        .route(
            "/quotations/{id}",
            get(get_quotation).put(update_quotation),
        )
        .route("/quotations/{id}/revise", post(revise_quotation))
        .route("/quotations/{id}/send", post(send_quotation))
        .route("/quotations/{id}/lock", post(lock_quotation))
        .route(
            "/projects/{project_ref}/quotations",
            get(list_project_quotations),
        )
        .route(
            "/projects/{project_ref}/quotations/next-version",
            get(get_next_version),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a quotation.
#[derive(Debug, Deserialize)]
pub struct CreateQuotationRequest {
    /// Project id or code.
    pub project: String,
    /// Baseline to quote against; defaults to the latest estimation.
    pub estimate_version: Option<i32>,
    /// Line items.
    #[serde(flatten)]
    pub items: QuotationItems,
    /// Remarks.
    pub remarks: Option<String>,
}

/// Request body for update and revise.
#[derive(Debug, Deserialize)]
pub struct QuotationContentRequest {
    /// Replacement line items.
    #[serde(flatten)]
    pub items: QuotationItems,
    /// Remarks; omitted keeps the current remarks.
    pub remarks: Option<String>,
}

/// Request body for sending a quotation.
#[derive(Debug, Deserialize)]
pub struct SendQuotationRequest {
    /// Recipient.
    pub sent_to: String,
}

/// Query parameters for the global listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuotationsQuery {
    /// Project id or code.
    pub project: Option<String>,
    /// Baseline filter.
    pub estimate_version: Option<i32>,
    /// Status filter.
    pub status: Option<String>,
    /// Created at or after.
    pub created_from: Option<DateTime<Utc>>,
    /// Created at or before.
    pub created_to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Query parameters for a project's version history.
#[derive(Debug, Default, Deserialize)]
pub struct VersionsQuery {
    /// Baseline filter.
    pub estimate_version: Option<i32>,
    /// Status filter.
    pub status: Option<String>,
}

/// Response for the next-version peek.
#[derive(Debug, Serialize)]
pub struct NextVersionResponse {
    /// Version the next quotation would receive.
    pub next_version: i32,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/quotations` - Create the next quotation version for a baseline.
async fn create_quotation(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateQuotationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state
        .quotation_service()
        .create_quotation(CreateQuotationInput {
            project_ref: payload.project,
            estimate_version: payload.estimate_version,
            items: payload.items,
            remarks: payload.remarks,
            created_by: actor.user_id(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(quotation)))
}

/// GET `/quotations` - Filtered, paginated listing.
async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuotationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| QuotationStatus::parse(s).ok_or_else(|| QuotationError::InvalidStatus(s.to_string())))
        .transpose()?;

    let project_id = match query.project.as_deref() {
        Some(project_ref) => Some(state.project_service().get(project_ref).await?.id),
        None => None,
    };

    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let filter = QuotationFilter {
        project_id,
        estimate_version: query.estimate_version,
        status,
        created_from: query.created_from,
        created_to: query.created_to,
    };

    let response = state.quotation_service().get_quotations(filter, page).await?;
    Ok(Json(response))
}

/// GET `/quotations/{id}` - Get one quotation.
async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state.quotation_service().get_quotation(id).await?;
    Ok(Json(quotation))
}

/// PUT `/quotations/{id}` - Edit an unlocked quotation in place.
async fn update_quotation(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuotationContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state
        .quotation_service()
        .update_quotation(id, content(payload, actor))
        .await?;
    Ok(Json(quotation))
}

/// POST `/quotations/{id}/revise` - Append a revised version.
async fn revise_quotation(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuotationContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state
        .quotation_service()
        .revise_quotation(id, content(payload, actor))
        .await?;
    Ok((StatusCode::CREATED, Json(quotation)))
}

/// POST `/quotations/{id}/send` - Record delivery to a recipient.
async fn send_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendQuotationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state
        .quotation_service()
        .send_quotation(id, &payload.sent_to)
        .await?;
    Ok(Json(quotation))
}

/// POST `/quotations/{id}/lock` - Confirm and lock a quotation.
async fn lock_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state.quotation_service().lock_quotation(id).await?;
    Ok(Json(quotation))
}

/// GET `/projects/{project_ref}/quotations` - Version history of a project.
async fn list_project_quotations(
    State(state): State<AppState>,
    Path(project_ref): Path<String>,
    Query(query): Query<VersionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quotations = state
        .quotation_service()
        .get_quotation_versions(&project_ref, query.estimate_version, query.status.as_deref())
        .await?;
    Ok(Json(quotations))
}

/// GET `/projects/{project_ref}/quotations/next-version` - Peek at the next version.
async fn get_next_version(
    State(state): State<AppState>,
    Path(project_ref): Path<String>,
    Query(query): Query<VersionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let next_version = state
        .quotation_service()
        .get_next_quotation_version(&project_ref, query.estimate_version)
        .await?;
    Ok(Json(NextVersionResponse { next_version }))
}

fn content(payload: QuotationContentRequest, actor: Actor) -> QuotationContentInput {
    QuotationContentInput {
        items: payload.items,
        remarks: payload.remarks,
        updated_by: actor.user_id(),
    }
}
