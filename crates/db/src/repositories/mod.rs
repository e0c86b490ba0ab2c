//! Repository abstractions for data access.
//!
//! Repositories implement the persistence traits declared by `estimo-core`,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod catalog;
pub mod estimation;
pub mod expense;
pub mod finance;
pub mod notification;
pub mod project;
pub mod quotation;
pub mod report;

pub use catalog::MaterialRepository;
pub use estimation::EstimationRepository;
pub use expense::ExpenseRepository;
pub use finance::FinanceSummaryRepository;
pub use notification::NotificationRepository;
pub use project::ProjectRepository;
pub use quotation::QuotationRepository;
pub use report::ReportRepository;

use sea_orm::{DbErr, SqlErr};

/// True if the error is a unique constraint violation.
///
/// Version sequencing relies on this to turn a lost insert race into a
/// retryable conflict.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
