//! Project directory contract and service.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::error::ProjectError;
use super::types::{CreateProjectInput, Project, ProjectStatus};

/// Repository trait for project lookups and updates.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait ProjectDirectory: Send + Sync {
    /// Find a project by primary id.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Project>, ProjectError>> + Send;

    /// Find a project by business key.
    fn find_by_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Option<Project>, ProjectError>> + Send;

    /// Persist a new project. A duplicate code yields `DuplicateCode`.
    fn create(
        &self,
        project: Project,
    ) -> impl std::future::Future<Output = Result<Project, ProjectError>> + Send;

    /// List all projects, oldest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Project>, ProjectError>> + Send;

    /// Set a project's status. Returns `None` if the project does not exist.
    fn update_status(
        &self,
        id: Uuid,
        status: ProjectStatus,
    ) -> impl std::future::Future<Output = Result<Option<Project>, ProjectError>> + Send;
}

/// Resolve a project by primary id, falling back to the business key.
///
/// # Errors
///
/// Returns `ProjectError::Validation` for an empty reference and
/// `ProjectError::NotFound` when neither lookup matches.
pub async fn resolve_project<P: ProjectDirectory>(
    directory: &P,
    reference: &str,
) -> Result<Project, ProjectError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ProjectError::Validation(
            "project reference is required".to_string(),
        ));
    }

    if let Ok(id) = Uuid::parse_str(reference) {
        if let Some(project) = directory.find_by_id(id).await? {
            return Ok(project);
        }
    }

    directory
        .find_by_code(reference)
        .await?
        .ok_or_else(|| ProjectError::NotFound(reference.to_string()))
}

/// Project service for creation, lookup, and status transitions.
pub struct ProjectService<P: ProjectDirectory> {
    directory: Arc<P>,
}

impl<P: ProjectDirectory> ProjectService<P> {
    /// Create a new project service.
    #[must_use]
    pub fn new(directory: Arc<P>) -> Self {
        Self { directory }
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank code or name and `DuplicateCode` if
    /// the business key is taken.
    pub async fn create(&self, input: CreateProjectInput) -> Result<Project, ProjectError> {
        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();
        if code.is_empty() {
            return Err(ProjectError::Validation("code is required".to_string()));
        }
        if name.is_empty() {
            return Err(ProjectError::Validation("name is required".to_string()));
        }
        if self.directory.find_by_code(&code).await?.is_some() {
            return Err(ProjectError::DuplicateCode(code));
        }

        let now = Utc::now();
        let project = self
            .directory
            .create(Project {
                id: Uuid::now_v7(),
                code,
                name,
                status: input.status.unwrap_or(ProjectStatus::Active),
                manager_id: input.manager_id,
                client_name: input.client_name,
                estimate_created: false,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(project_id = %project.id, code = %project.code, "Project created");
        Ok(project)
    }

    /// Get a project by id or business key.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the reference does not resolve.
    pub async fn get(&self, reference: &str) -> Result<Project, ProjectError> {
        resolve_project(&*self.directory, reference).await
    }

    /// List all projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<Project>, ProjectError> {
        self.directory.list().await
    }

    /// Transition a project to a new status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` for an unknown status and `NotFound` for an
    /// unknown project.
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Project, ProjectError> {
        let status =
            ProjectStatus::parse(status).ok_or_else(|| ProjectError::InvalidStatus(status.to_string()))?;

        let project = self
            .directory
            .update_status(id, status)
            .await?
            .ok_or_else(|| ProjectError::NotFound(id.to_string()))?;

        info!(project_id = %id, status = %status, "Project status updated");
        Ok(project)
    }
}
