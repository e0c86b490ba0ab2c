//! Spend tracking error types.

use thiserror::Error;
use uuid::Uuid;

use crate::estimation::EstimationError;
use crate::project::ProjectError;

/// Errors that can occur while recording expenses or computing budget health.
#[derive(Debug, Error)]
pub enum SpendError {
    /// Project reference did not resolve.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// Category is not labor, procurement, transport, or misc.
    #[error("Invalid expense category: {0}")]
    InvalidCategory(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl SpendError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProjectNotFound(_) | Self::NotFound(_) => 404,
            Self::InvalidCategory(_) | Self::Validation(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            Self::NotFound(_) => "EXPENSE_NOT_FOUND",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ProjectError> for SpendError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(reference) => Self::ProjectNotFound(reference),
            ProjectError::Database(msg) => Self::Database(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<EstimationError> for SpendError {
    fn from(err: EstimationError) -> Self {
        match err {
            EstimationError::ProjectNotFound(reference) => Self::ProjectNotFound(reference),
            other => Self::Database(other.to_string()),
        }
    }
}
