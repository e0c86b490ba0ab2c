//! Budget health calculations.
//!
//! Percentages are compared exactly against the thresholds and reported
//! rounded to one decimal place.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;
use uuid::Uuid;

use super::types::{
    BudgetHealth, CategoryHealth, Expense, ExpenseCategory, HealthStatus, ThresholdEvaluation,
};
use crate::estimation::Estimation;
use crate::notification::{
    EVENT_BUDGET_THRESHOLD_EXCEEDED, EVENT_EXPENSE_EXCEEDS_BUDGET, Notification, Priority,
    Recipient, RelatedEntity,
};
use crate::project::Project;

/// Spend percentage at which a category is at risk.
pub const AT_RISK_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
/// Spend percentage at which a category has used its whole budget.
pub const OVER_BUDGET_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Spend as an exact percentage of budget; zero when there is no budget.
///
/// Saturates at `Decimal::MAX` when the percentage is not representable.
#[must_use]
pub fn spend_percentage(spent: Decimal, budget: Decimal) -> Decimal {
    if budget <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    spent
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(budget))
        .unwrap_or(Decimal::MAX)
}

/// Classify an exact percentage.
#[must_use]
pub fn classify(percentage: Decimal) -> HealthStatus {
    if percentage > OVER_BUDGET_THRESHOLD {
        HealthStatus::OverBudget
    } else if percentage >= AT_RISK_THRESHOLD {
        HealthStatus::AtRisk
    } else {
        HealthStatus::OnTrack
    }
}

/// Round a percentage for display.
#[must_use]
pub fn report_percentage(percentage: Decimal) -> Decimal {
    percentage.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Health of one category.
#[must_use]
pub fn category_health(category: ExpenseCategory, budget: Decimal, spent: Decimal) -> CategoryHealth {
    let percentage = spend_percentage(spent, budget);
    CategoryHealth {
        category,
        budget_field: category.budget_category().field_name().to_string(),
        budget,
        spent,
        remaining: budget.saturating_sub(spent),
        percentage: report_percentage(percentage),
        status: classify(percentage),
    }
}

/// Health of a project across all four categories.
///
/// Without an estimation every budget is zero and every category on track.
#[must_use]
pub fn budget_health(
    project_id: Uuid,
    estimation: Option<&Estimation>,
    spent_by_category: &HashMap<ExpenseCategory, Decimal>,
) -> BudgetHealth {
    let categories: Vec<CategoryHealth> = ExpenseCategory::ALL
        .iter()
        .map(|category| {
            let budget =
                estimation.map_or(Decimal::ZERO, |e| e.budget_for(category.budget_category()));
            let spent = spent_by_category
                .get(category)
                .copied()
                .unwrap_or(Decimal::ZERO);
            category_health(*category, budget, spent)
        })
        .collect();

    let total_budget = categories
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.budget));
    let total_spent = categories
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.spent));
    let percentage = spend_percentage(total_spent, total_budget);

    BudgetHealth {
        project_id,
        estimation_version: estimation.map(|e| e.version),
        categories,
        total_budget,
        total_spent,
        total_remaining: total_budget.saturating_sub(total_spent),
        percentage: report_percentage(percentage),
        status: classify(percentage),
    }
}

/// Threshold check for one category after an expense.
#[must_use]
pub fn evaluate_threshold(
    category: ExpenseCategory,
    budget: Decimal,
    spent: Decimal,
) -> (ThresholdEvaluation, Decimal) {
    let percentage = spend_percentage(spent, budget);
    (
        ThresholdEvaluation {
            category,
            budget,
            spent,
            percentage: report_percentage(percentage),
            status: classify(percentage),
            alerts: Vec::new(),
        },
        percentage,
    )
}

/// Notifications owed for a category crossing its thresholds.
///
/// - at or above 80%: `budget_threshold_exceeded` (high) to each finance role
/// - at or above 100%: also `expense_exceeds_budget` (urgent) to each
///   finance role and directly to the project manager
#[must_use]
pub fn threshold_notifications(
    project: &Project,
    expense: &Expense,
    evaluation: &ThresholdEvaluation,
    exact_percentage: Decimal,
    finance_roles: &[String],
) -> Vec<Notification> {
    let mut notifications = Vec::new();
    if exact_percentage < AT_RISK_THRESHOLD {
        return notifications;
    }

    let related = Some(RelatedEntity {
        kind: "expense".to_string(),
        id: expense.id,
    });
    let metadata = json!({
        "project_id": project.id,
        "project_code": project.code,
        "category": evaluation.category,
        "budget_field": evaluation.category.budget_category().field_name(),
        "budget": evaluation.budget,
        "spent": evaluation.spent,
        "percentage": evaluation.percentage,
        "expense_amount": expense.amount,
    });

    for role in finance_roles {
        notifications.push(Notification {
            recipient: Recipient::Role(role.clone()),
            event_type: EVENT_BUDGET_THRESHOLD_EXCEEDED.to_string(),
            title: format!("Budget threshold reached: {}", project.name),
            message: format!(
                "{} spend on {} is at {}% of budget ({} of {})",
                evaluation.category,
                project.code,
                evaluation.percentage,
                evaluation.spent,
                evaluation.budget
            ),
            related_entity: related.clone(),
            metadata: metadata.clone(),
            priority: Priority::High,
        });
    }

    if exact_percentage >= OVER_BUDGET_THRESHOLD {
        let title = format!("Expense exceeds budget: {}", project.name);
        let message = format!(
            "{} spend on {} has reached {}% of budget ({} of {})",
            evaluation.category,
            project.code,
            evaluation.percentage,
            evaluation.spent,
            evaluation.budget
        );
        let recipients = finance_roles
            .iter()
            .cloned()
            .map(Recipient::Role)
            .chain(project.manager_id.map(Recipient::User));

        for recipient in recipients {
            notifications.push(Notification {
                recipient,
                event_type: EVENT_EXPENSE_EXCEEDS_BUDGET.to_string(),
                title: title.clone(),
                message: message.clone(),
                related_entity: related.clone(),
                metadata: metadata.clone(),
                priority: Priority::Urgent,
            });
        }
    }

    notifications
}
