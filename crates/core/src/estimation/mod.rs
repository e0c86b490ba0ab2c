//! Estimation versioning.
//!
//! Every re-estimate appends a new baseline version for the project; the
//! highest version is the latest baseline. Only the approval status of an
//! existing version ever changes.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::EstimationError;
pub use service::{EstimationRepository, EstimationService};
pub use types::{
    BudgetCategory, CreateEstimationInput, Estimation, EstimationFilter, EstimationStatus,
};
