//! Estimation error types.

use thiserror::Error;
use uuid::Uuid;

use crate::project::ProjectError;

/// Errors that can occur while versioning estimations.
#[derive(Debug, Error)]
pub enum EstimationError {
    /// Project reference did not resolve.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Estimation not found.
    #[error("Estimation not found: {0}")]
    NotFound(Uuid),

    /// Status value is not one of pending, approved, rejected.
    #[error("Invalid estimation status: {0}")]
    InvalidStatus(String),

    /// A budget field is negative.
    #[error("{field} cannot be negative")]
    NegativeCost {
        /// Offending field.
        field: &'static str,
    },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another writer took this version number.
    #[error("Estimation version {version} already exists for project {project_id}")]
    VersionConflict {
        /// Project whose lineage collided.
        project_id: Uuid,
        /// Contended version.
        version: i32,
    },

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl EstimationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProjectNotFound(_) | Self::NotFound(_) => 404,
            Self::InvalidStatus(_) | Self::NegativeCost { .. } | Self::Validation(_) => 400,
            Self::VersionConflict { .. } => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            Self::NotFound(_) => "ESTIMATION_NOT_FOUND",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::NegativeCost { .. } => "NEGATIVE_COST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ProjectError> for EstimationError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(reference) => Self::ProjectNotFound(reference),
            ProjectError::Database(msg) => Self::Database(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(EstimationError::NotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(
            EstimationError::InvalidStatus("x".into()).status_code(),
            400
        );
        assert_eq!(
            EstimationError::VersionConflict {
                project_id: Uuid::nil(),
                version: 2
            }
            .status_code(),
            409
        );
        assert_eq!(EstimationError::Database("x".into()).status_code(), 500);
    }

    #[test]
    fn test_project_error_conversion() {
        let err: EstimationError = ProjectError::NotFound("PRJ-9".into()).into();
        assert!(matches!(err, EstimationError::ProjectNotFound(r) if r == "PRJ-9"));
        assert_eq!(
            EstimationError::from(ProjectError::Validation("blank".into())).error_code(),
            "VALIDATION_ERROR"
        );
    }
}
