//! Spend tracking against estimation budgets.
//!
//! Expenses are recorded per project and category. Each category maps onto
//! exactly one estimation budget field, and spend is classified as
//! on track (< 80%), at risk (80% to 100%), or over budget (> 100%).

pub mod error;
pub mod health;
pub mod service;
pub mod types;

pub use error::SpendError;
pub use health::{
    AT_RISK_THRESHOLD, OVER_BUDGET_THRESHOLD, budget_health, category_health, classify,
    evaluate_threshold, report_percentage, spend_percentage, threshold_notifications,
};
pub use service::{ExpenseRepository, SpendService};
pub use types::{
    BudgetHealth, CategoryHealth, CorrectExpenseInput, Expense, ExpenseCategory, ExpenseFilter,
    HealthStatus, RecordExpenseInput, RecordedExpense, ThresholdEvaluation,
};
