//! Error rendering for API responses.
//!
//! Every domain error becomes `{"error": CODE, "message": ...}` with the
//! status its type declares. Infrastructure failures are logged and
//! answered with an opaque message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use estimo_core::estimation::EstimationError;
use estimo_core::finance::FinanceError;
use estimo_core::project::ProjectError;
use estimo_core::quotation::QuotationError;
use estimo_core::reports::ReportError;
use estimo_core::spend::SpendError;
use estimo_shared::AppError;

/// An error ready to be rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Build an error from a numeric status, code, and message.
    #[must_use]
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message: message.into(),
        }
    }

    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "Request failed");
            "An error occurred".to_string()
        } else {
            self.message
        };

        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": message
            })),
        )
            .into_response()
    }
}

macro_rules! impl_from_domain_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(err: $error) -> Self {
                    Self::new(err.status_code(), err.error_code(), err.to_string())
                }
            }
        )*
    };
}

impl_from_domain_error!(
    AppError,
    ProjectError,
    EstimationError,
    QuotationError,
    SpendError,
    FinanceError,
    ReportError,
);
