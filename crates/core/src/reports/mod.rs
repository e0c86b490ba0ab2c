//! Monthly financial reporting.
//!
//! This module provides pure aggregation over a month of ledger data:
//! - Approved income by type and method
//! - Expenses by category and project
//! - Budget vs actual variance per project and category
//! - Payment, quotation, estimation, and purchase-order status counts
//! - A composite alerts block

pub mod cache;
pub mod error;
pub mod service;
pub mod types;


pub use cache::ReportCache;
pub use error::ReportError;
pub use service::{MonthlyReportService, MonthlyReportSource, ReportService};
pub use types::*;
