//! Estimation domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Approval status of an estimation version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted as the working budget.
    Approved,
    /// Declined.
    Rejected,
}

impl EstimationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for EstimationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four budget fields of an estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCategory {
    /// `labor_cost`.
    Labor,
    /// `material_cost`.
    Material,
    /// `service_cost` (service and transport).
    Service,
    /// `contingency_cost` (contingency and miscellaneous).
    Contingency,
}

impl BudgetCategory {
    /// Returns the name of the estimation field backing this category.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Labor => "labor_cost",
            Self::Material => "material_cost",
            Self::Service => "service_cost",
            Self::Contingency => "contingency_cost",
        }
    }
}

/// A budget baseline version for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimation {
    /// Estimation ID.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Version within the project, starting at 1.
    pub version: i32,
    /// Labor budget.
    pub labor_cost: Decimal,
    /// Material budget.
    pub material_cost: Decimal,
    /// Service and transport budget.
    pub service_cost: Decimal,
    /// Contingency and miscellaneous budget.
    pub contingency_cost: Decimal,
    /// Sum of the four budgets.
    pub total_cost: Decimal,
    /// Approval status.
    pub status: EstimationStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// User who requested the estimate.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl Estimation {
    /// Returns the budget for one category.
    #[must_use]
    pub fn budget_for(&self, category: BudgetCategory) -> Decimal {
        match category {
            BudgetCategory::Labor => self.labor_cost,
            BudgetCategory::Material => self.material_cost,
            BudgetCategory::Service => self.service_cost,
            BudgetCategory::Contingency => self.contingency_cost,
        }
    }
}

/// Input for creating a new estimation version.
#[derive(Debug, Clone)]
pub struct CreateEstimationInput {
    /// Project id or business key.
    pub project_ref: String,
    /// Labor budget.
    pub labor_cost: Decimal,
    /// Material budget.
    pub material_cost: Decimal,
    /// Service and transport budget.
    pub service_cost: Decimal,
    /// Contingency and miscellaneous budget.
    pub contingency_cost: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Requesting user.
    pub created_by: Option<Uuid>,
}

/// Filter for listing estimations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimationFilter {
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<EstimationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_parse() {
        assert_eq!(
            EstimationStatus::parse("Approved"),
            Some(EstimationStatus::Approved)
        );
        assert_eq!(
            EstimationStatus::parse(" pending "),
            Some(EstimationStatus::Pending)
        );
        assert_eq!(EstimationStatus::parse("confirmed"), None);
    }

    #[test]
    fn test_budget_for_each_category() {
        let now = Utc::now();
        let estimation = Estimation {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            version: 1,
            labor_cost: dec!(1),
            material_cost: dec!(2),
            service_cost: dec!(3),
            contingency_cost: dec!(4),
            total_cost: dec!(10),
            status: EstimationStatus::Pending,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(estimation.budget_for(BudgetCategory::Labor), dec!(1));
        assert_eq!(estimation.budget_for(BudgetCategory::Material), dec!(2));
        assert_eq!(estimation.budget_for(BudgetCategory::Service), dec!(3));
        assert_eq!(estimation.budget_for(BudgetCategory::Contingency), dec!(4));
    }
}
