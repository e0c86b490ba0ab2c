//! Spend tracking types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::estimation::BudgetCategory;

/// Expense category.
///
/// Mapped one-to-one onto estimation budget fields:
///
/// | Category      | Budget field       |
/// |---------------|--------------------|
/// | `Labor`       | `labor_cost`       |
/// | `Procurement` | `material_cost`    |
/// | `Transport`   | `service_cost`     |
/// | `Misc`        | `contingency_cost` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Labor spend.
    Labor,
    /// Material purchases.
    Procurement,
    /// Transport and services.
    Transport,
    /// Everything else.
    Misc,
}

impl ExpenseCategory {
    /// All categories, in budget field order.
    pub const ALL: [Self; 4] = [Self::Labor, Self::Procurement, Self::Transport, Self::Misc];

    /// Returns the string representation of the category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Labor => "labor",
            Self::Procurement => "procurement",
            Self::Transport => "transport",
            Self::Misc => "misc",
        }
    }

    /// Parses a category from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "labor" | "labour" => Some(Self::Labor),
            "procurement" => Some(Self::Procurement),
            "transport" => Some(Self::Transport),
            "misc" | "miscellaneous" => Some(Self::Misc),
            _ => None,
        }
    }

    /// The estimation budget this category spends against.
    #[must_use]
    pub fn budget_category(&self) -> BudgetCategory {
        match self {
            Self::Labor => BudgetCategory::Labor,
            Self::Procurement => BudgetCategory::Material,
            Self::Transport => BudgetCategory::Service,
            Self::Misc => BudgetCategory::Contingency,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Category.
    pub category: ExpenseCategory,
    /// Amount, always positive.
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// Receipt or proof document.
    pub proof_url: Option<String>,
    /// Recorder.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last correction timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct RecordExpenseInput {
    /// Project id or business key.
    pub project_ref: String,
    /// Category name.
    pub category: String,
    /// Amount.
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// Recorder.
    pub created_by: Option<Uuid>,
    /// Proof document.
    pub proof_url: Option<String>,
}

/// Narrow correction of an expense. Unset fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorrectExpenseInput {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
    /// New proof document.
    pub proof_url: Option<String>,
}

/// Filter for listing expenses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseFilter {
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one category.
    pub category: Option<ExpenseCategory>,
}

/// Budget health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Below 80%.
    OnTrack,
    /// From 80% to 100%.
    AtRisk,
    /// Above 100%.
    OverBudget,
}

impl HealthStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::AtRisk => "at_risk",
            Self::OverBudget => "over_budget",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spend against one budget category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryHealth {
    /// Expense category.
    pub category: ExpenseCategory,
    /// Estimation field the budget comes from.
    pub budget_field: String,
    /// Budgeted amount.
    pub budget: Decimal,
    /// Total spent.
    pub spent: Decimal,
    /// `budget - spent`, negative when over.
    pub remaining: Decimal,
    /// Spend as a percentage of budget, 1 decimal place.
    pub percentage: Decimal,
    /// Classification.
    pub status: HealthStatus,
}

/// Budget health of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetHealth {
    /// Project.
    pub project_id: Uuid,
    /// Estimation version the budgets come from.
    pub estimation_version: Option<i32>,
    /// Per-category breakdown.
    pub categories: Vec<CategoryHealth>,
    /// Sum of budgets.
    pub total_budget: Decimal,
    /// Sum of spend.
    pub total_spent: Decimal,
    /// `total_budget - total_spent`.
    pub total_remaining: Decimal,
    /// Overall percentage, 1 decimal place.
    pub percentage: Decimal,
    /// Overall classification.
    pub status: HealthStatus,
}

/// Category threshold check run after recording an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdEvaluation {
    /// Category checked.
    pub category: ExpenseCategory,
    /// Budget for the category.
    pub budget: Decimal,
    /// Cumulative spend including the new expense.
    pub spent: Decimal,
    /// Spend percentage, 1 decimal place.
    pub percentage: Decimal,
    /// Classification.
    pub status: HealthStatus,
    /// Event types emitted.
    pub alerts: Vec<String>,
}

/// Result of recording an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedExpense {
    /// The stored expense.
    pub expense: Expense,
    /// Threshold check for its category.
    pub threshold: ThresholdEvaluation,
}
