//! Estimation versioning service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::EstimationError;
use super::types::{CreateEstimationInput, Estimation, EstimationFilter, EstimationStatus};
use crate::project::{ProjectDirectory, resolve_project};
use crate::versioning::{MAX_VERSION_ATTEMPTS, next_version};

/// Repository trait for estimation persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait EstimationRepository: Send + Sync {
    /// Highest-version estimation for a project.
    fn latest_for_project(
        &self,
        project_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Estimation>, EstimationError>> + Send;

    /// Estimation at a specific version.
    fn find_by_version(
        &self,
        project_id: Uuid,
        version: i32,
    ) -> impl std::future::Future<Output = Result<Option<Estimation>, EstimationError>> + Send;

    /// Find estimation by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Estimation>, EstimationError>> + Send;

    /// Insert a new version.
    ///
    /// Must fail with `VersionConflict` if `(project_id, version)` exists.
    /// When `first_for_project` is set, the owning project's
    /// `estimate_created` flag is raised in the same transaction.
    fn insert(
        &self,
        estimation: Estimation,
        first_for_project: bool,
    ) -> impl std::future::Future<Output = Result<Estimation, EstimationError>> + Send;

    /// List estimations, oldest first, versions ascending.
    fn list(
        &self,
        filter: EstimationFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Estimation>, EstimationError>> + Send;

    /// Set the approval status. Returns `None` if the estimation does not exist.
    fn set_status(
        &self,
        id: Uuid,
        status: EstimationStatus,
        updated_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<Estimation>, EstimationError>> + Send;
}

/// Estimation service: creates baseline versions and exposes the latest one.
pub struct EstimationService<R: EstimationRepository, P: ProjectDirectory> {
    repo: Arc<R>,
    projects: Arc<P>,
}

impl<R: EstimationRepository, P: ProjectDirectory> EstimationService<R, P> {
    /// Create a new estimation service.
    #[must_use]
    pub fn new(repo: Arc<R>, projects: Arc<P>) -> Self {
        Self { repo, projects }
    }

    /// Create the next estimation version for a project.
    ///
    /// The version is `latest + 1` (1 for the first estimate) and the new row
    /// starts `Pending`. The first estimate raises the project's
    /// `estimate_created` flag.
    ///
    /// # Errors
    ///
    /// - `NegativeCost` if any budget is below zero
    /// - `ProjectNotFound` if the project reference does not resolve
    /// - `VersionConflict` if concurrent writers exhaust the retry budget
    pub async fn create_or_update_estimate(
        &self,
        input: CreateEstimationInput,
    ) -> Result<Estimation, EstimationError> {
        validate_costs(&input)?;

        let project = resolve_project(&*self.projects, &input.project_ref).await?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let latest = self.repo.latest_for_project(project.id).await?;
            let first_for_project = latest.is_none() || !project.estimate_created;
            let version = next_version(latest.map(|e| e.version));

            let now = Utc::now();
            let estimation = Estimation {
                id: Uuid::now_v7(),
                project_id: project.id,
                version,
                labor_cost: input.labor_cost,
                material_cost: input.material_cost,
                service_cost: input.service_cost,
                contingency_cost: input.contingency_cost,
                total_cost: input.labor_cost
                    + input.material_cost
                    + input.service_cost
                    + input.contingency_cost,
                status: EstimationStatus::Pending,
                notes: input.notes.clone(),
                created_by: input.created_by,
                created_at: now,
                updated_at: now,
            };

            match self.repo.insert(estimation, first_for_project).await {
                Ok(created) => {
                    info!(
                        project_id = %project.id,
                        estimation_id = %created.id,
                        version = created.version,
                        "Estimation version created"
                    );
                    return Ok(created);
                }
                Err(EstimationError::VersionConflict { version, .. })
                    if attempt < MAX_VERSION_ATTEMPTS =>
                {
                    warn!(
                        project_id = %project.id,
                        version,
                        attempt,
                        "Estimation version taken by a concurrent writer, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Latest estimation for a project, or `None` if none exist.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project reference does not resolve.
    pub async fn get_latest_estimate(
        &self,
        project_ref: &str,
    ) -> Result<Option<Estimation>, EstimationError> {
        let project = resolve_project(&*self.projects, project_ref).await?;
        self.repo.latest_for_project(project.id).await
    }

    /// Get an estimation by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the estimation does not exist.
    pub async fn get_estimate(&self, id: Uuid) -> Result<Estimation, EstimationError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(EstimationError::NotFound(id))
    }

    /// Set the approval status of an estimation.
    ///
    /// No other record changes as a consequence.
    ///
    /// # Errors
    ///
    /// - `InvalidStatus` unless the status is pending, approved, or rejected
    /// - `NotFound` if the estimation does not exist
    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<Estimation, EstimationError> {
        let status = EstimationStatus::parse(status)
            .ok_or_else(|| EstimationError::InvalidStatus(status.to_string()))?;

        let estimation = self
            .repo
            .set_status(id, status, Utc::now())
            .await?
            .ok_or(EstimationError::NotFound(id))?;

        info!(
            estimation_id = %id,
            project_id = %estimation.project_id,
            status = %status,
            "Estimation status updated"
        );
        Ok(estimation)
    }

    /// All estimation versions of a project, ascending.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project reference does not resolve.
    pub async fn get_estimates_by_project(
        &self,
        project_ref: &str,
    ) -> Result<Vec<Estimation>, EstimationError> {
        let project = resolve_project(&*self.projects, project_ref).await?;
        self.repo
            .list(EstimationFilter {
                project_id: Some(project.id),
                status: None,
            })
            .await
    }

    /// Every estimation in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn get_all_estimates(&self) -> Result<Vec<Estimation>, EstimationError> {
        self.repo.list(EstimationFilter::default()).await
    }

    /// Every approved estimation.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn get_approved_estimates(&self) -> Result<Vec<Estimation>, EstimationError> {
        self.repo
            .list(EstimationFilter {
                project_id: None,
                status: Some(EstimationStatus::Approved),
            })
            .await
    }
}

fn validate_costs(input: &CreateEstimationInput) -> Result<(), EstimationError> {
    for (field, value) in [
        ("labor_cost", input.labor_cost),
        ("material_cost", input.material_cost),
        ("service_cost", input.service_cost),
        ("contingency_cost", input.contingency_cost),
    ] {
        if value < Decimal::ZERO {
            return Err(EstimationError::NegativeCost { field });
        }
    }
    Ok(())
}
