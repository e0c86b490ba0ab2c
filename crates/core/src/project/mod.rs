//! Project directory.
//!
//! Projects are the identity anchor for estimations, quotations, and
//! expenses. Intake lives outside this crate; the engine only resolves,
//! creates, and status-transitions them.

mod error;
mod service;
mod types;

pub use error::ProjectError;
pub use service::{ProjectDirectory, ProjectService, resolve_project};
pub use types::{CreateProjectInput, Project, ProjectStatus};
