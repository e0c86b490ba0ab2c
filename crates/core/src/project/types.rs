//! Project domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work is paused.
    OnHold,
    /// Project accepted, work not started.
    Active,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Completed,
    /// Project was abandoned.
    Cancelled,
}

impl ProjectStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnHold => "on_hold",
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status, ignoring case and `_`/`-`/space separators.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "onhold" => Some(Self::OnHold),
            "active" => Some(Self::Active),
            "inprogress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID.
    pub id: Uuid,
    /// Business key (e.g. `PRJ-2025-014`), unique.
    pub code: String,
    /// Project name.
    pub name: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Project manager, notified directly on budget overruns.
    pub manager_id: Option<Uuid>,
    /// Client name.
    pub client_name: Option<String>,
    /// Set once the first estimation is created; never cleared.
    pub estimate_created: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Business key.
    pub code: String,
    /// Project name.
    pub name: String,
    /// Initial status, defaults to `Active`.
    pub status: Option<ProjectStatus>,
    /// Project manager.
    pub manager_id: Option<Uuid>,
    /// Client name.
    pub client_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            ProjectStatus::OnHold,
            ProjectStatus::Active,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_parse_is_lenient_about_separators() {
        assert_eq!(ProjectStatus::parse("OnHold"), Some(ProjectStatus::OnHold));
        assert_eq!(
            ProjectStatus::parse("In Progress"),
            Some(ProjectStatus::InProgress)
        );
        assert_eq!(ProjectStatus::parse("archived"), None);
    }
}
