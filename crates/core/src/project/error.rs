//! Project error types.

use thiserror::Error;

/// Errors that can occur while resolving or mutating projects.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// No project matches the given id or business key.
    #[error("Project not found: {0}")]
    NotFound(String),

    /// Another project already uses this business key.
    #[error("Project code already exists: {0}")]
    DuplicateCode(String),

    /// Status value is not one of the known project statuses.
    #[error("Invalid project status: {0}")]
    InvalidStatus(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl ProjectError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::DuplicateCode(_) => 409,
            Self::InvalidStatus(_) | Self::Validation(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PROJECT_NOT_FOUND",
            Self::DuplicateCode(_) => "DUPLICATE_PROJECT_CODE",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
