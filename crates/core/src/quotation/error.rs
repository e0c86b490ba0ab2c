//! Quotation error types.

use thiserror::Error;
use uuid::Uuid;

use crate::estimation::EstimationError;
use crate::project::ProjectError;

/// Errors that can occur in the quotation engine.
#[derive(Debug, Error)]
pub enum QuotationError {
    /// Project reference did not resolve.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Quotation not found.
    #[error("Quotation not found: {0}")]
    NotFound(Uuid),

    /// The baseline to quote against does not exist.
    #[error("No estimation {} for project {project_id}", display_version(*.estimate_version))]
    EstimationNotFound {
        /// Project that was searched.
        project_id: Uuid,
        /// Requested version, or `None` for "latest".
        estimate_version: Option<i32>,
    },

    /// Mutation attempted on a locked quotation.
    #[error("Quotation {0} is locked")]
    Locked(Uuid),

    /// Status value is not a known quotation status.
    #[error("Invalid quotation status: {0}")]
    InvalidStatus(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another writer took this version number.
    #[error(
        "Quotation version {version} already exists for project {project_id}, estimate version {estimate_version}"
    )]
    VersionConflict {
        /// Project whose lineage collided.
        project_id: Uuid,
        /// Baseline of the lineage.
        estimate_version: i32,
        /// Contended version.
        version: i32,
    },

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),
}

fn display_version(version: Option<i32>) -> String {
    version.map_or_else(|| "(none yet)".to_string(), |v| format!("version {v}"))
}

impl QuotationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProjectNotFound(_) | Self::NotFound(_) | Self::EstimationNotFound { .. } => 404,
            Self::InvalidStatus(_) | Self::Validation(_) => 400,
            Self::VersionConflict { .. } => 409,
            Self::Locked(_) => 423,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            Self::NotFound(_) => "QUOTATION_NOT_FOUND",
            Self::EstimationNotFound { .. } => "ESTIMATION_NOT_FOUND",
            Self::Locked(_) => "QUOTATION_LOCKED",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ProjectError> for QuotationError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(reference) => Self::ProjectNotFound(reference),
            ProjectError::Database(msg) => Self::Database(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<EstimationError> for QuotationError {
    fn from(err: EstimationError) -> Self {
        match err {
            EstimationError::ProjectNotFound(reference) => Self::ProjectNotFound(reference),
            EstimationError::Database(msg) => Self::Database(msg),
            other => Self::Database(other.to_string()),
        }
    }
}
