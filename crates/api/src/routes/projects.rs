//! Project directory routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};
use estimo_core::project::{CreateProjectInput, ProjectError, ProjectStatus};

/// Creates the project routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{project_ref}", get(get_project))
        .route("/projects/{project_ref}/status", put(update_project_status))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Business key.
    pub code: String,
    /// Project name.
    pub name: String,
    /// Initial status; defaults to `active`.
    pub status: Option<String>,
    /// Project manager.
    pub manager_id: Option<Uuid>,
    /// Client name.
    pub client_name: Option<String>,
}

/// Request body for a status transition.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status.
    pub status: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/projects` - Create a project.
async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = payload
        .status
        .as_deref()
        .map(|s| ProjectStatus::parse(s).ok_or_else(|| ProjectError::InvalidStatus(s.to_string())))
        .transpose()?;

    let project = state
        .project_service()
        .create(CreateProjectInput {
            code: payload.code,
            name: payload.name,
            status,
            manager_id: payload.manager_id,
            client_name: payload.client_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET `/projects` - List projects.
async fn list_projects(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let projects = state.project_service().list().await?;
    Ok(Json(projects))
}

/// GET `/projects/{project_ref}` - Get a project by id or code.
async fn get_project(
    State(state): State<AppState>,
    Path(project_ref): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.project_service().get(&project_ref).await?;
    Ok(Json(project))
}

/// PUT `/projects/{project_ref}/status` - Transition a project's status.
async fn update_project_status(
    State(state): State<AppState>,
    Path(project_ref): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.project_service();
    let project = service.get(&project_ref).await?;
    let updated = service.update_status(project.id, &payload.status).await?;
    Ok(Json(updated))
}
