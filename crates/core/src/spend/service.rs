//! Expense recording and budget health service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::SpendError;
use super::health::{budget_health, evaluate_threshold, threshold_notifications};
use super::types::{
    BudgetHealth, CorrectExpenseInput, Expense, ExpenseCategory, ExpenseFilter,
    RecordExpenseInput, RecordedExpense,
};
use crate::estimation::EstimationRepository;
use crate::notification::{Notifier, dispatch};
use crate::project::{ProjectDirectory, resolve_project};

/// Repository trait for expense persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait ExpenseRepository: Send + Sync {
    /// Insert a new expense.
    fn insert(
        &self,
        expense: Expense,
    ) -> impl std::future::Future<Output = Result<Expense, SpendError>> + Send;

    /// Find expense by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Expense>, SpendError>> + Send;

    /// Overwrite an expense.
    fn update(
        &self,
        expense: Expense,
    ) -> impl std::future::Future<Output = Result<Expense, SpendError>> + Send;

    /// List expenses, newest first.
    fn list(
        &self,
        filter: ExpenseFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Expense>, SpendError>> + Send;

    /// Total spend of a project, per category.
    fn totals_by_category(
        &self,
        project_id: Uuid,
    ) -> impl std::future::Future<Output = Result<HashMap<ExpenseCategory, Decimal>, SpendError>> + Send;
}

/// Spend tracking service.
pub struct SpendService<X, E, P, N>
where
    X: ExpenseRepository,
    E: EstimationRepository,
    P: ProjectDirectory,
    N: Notifier,
{
    expenses: Arc<X>,
    estimations: Arc<E>,
    projects: Arc<P>,
    notifier: Arc<N>,
    finance_roles: Vec<String>,
}

impl<X, E, P, N> SpendService<X, E, P, N>
where
    X: ExpenseRepository,
    E: EstimationRepository,
    P: ProjectDirectory,
    N: Notifier,
{
    /// Create a new spend service.
    ///
    /// `finance_roles` receive threshold notifications.
    #[must_use]
    pub fn new(
        expenses: Arc<X>,
        estimations: Arc<E>,
        projects: Arc<P>,
        notifier: Arc<N>,
        finance_roles: Vec<String>,
    ) -> Self {
        Self {
            expenses,
            estimations,
            projects,
            notifier,
            finance_roles,
        }
    }

    /// Record an expense and check its category against the latest budget.
    ///
    /// Threshold notifications are sent once, synchronously, for this call.
    /// Notification failures are logged and do not fail the write.
    ///
    /// # Errors
    ///
    /// - `InvalidCategory` for an unknown category
    /// - `Validation` for a non-positive amount or blank description
    /// - `ProjectNotFound` if the project reference does not resolve
    pub async fn record_expense(
        &self,
        input: RecordExpenseInput,
    ) -> Result<RecordedExpense, SpendError> {
        let category = ExpenseCategory::parse(&input.category)
            .ok_or_else(|| SpendError::InvalidCategory(input.category.clone()))?;
        validate_amount(input.amount)?;
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(SpendError::Validation(
                "description is required".to_string(),
            ));
        }

        let project = resolve_project(&*self.projects, &input.project_ref).await?;

        let now = Utc::now();
        let expense = self
            .expenses
            .insert(Expense {
                id: Uuid::now_v7(),
                project_id: project.id,
                category,
                amount: input.amount,
                description,
                proof_url: input.proof_url,
                created_by: input.created_by,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(
            expense_id = %expense.id,
            project_id = %project.id,
            category = %category,
            amount = %expense.amount,
            "Expense recorded"
        );

        let spent = self
            .expenses
            .totals_by_category(project.id)
            .await?
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let budget = self
            .estimations
            .latest_for_project(project.id)
            .await?
            .map_or(Decimal::ZERO, |e| e.budget_for(category.budget_category()));

        let (mut threshold, exact) = evaluate_threshold(category, budget, spent);
        let notifications =
            threshold_notifications(&project, &expense, &threshold, exact, &self.finance_roles);

        if !notifications.is_empty() {
            threshold.alerts = notifications.iter().map(|n| n.event_type.clone()).collect();
            threshold.alerts.dedup();

            warn!(
                project_id = %project.id,
                category = %category,
                percentage = %threshold.percentage,
                status = %threshold.status,
                "Budget threshold crossed"
            );
            let total = notifications.len();
            let delivered = dispatch(&*self.notifier, notifications).await;
            if delivered < total {
                warn!(
                    expense_id = %expense.id,
                    delivered,
                    total,
                    "Some threshold notifications were not delivered"
                );
            }
        }

        Ok(RecordedExpense { expense, threshold })
    }

    /// Get an expense by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the expense does not exist.
    pub async fn get_expense(&self, id: Uuid) -> Result<Expense, SpendError> {
        self.expenses
            .find_by_id(id)
            .await?
            .ok_or(SpendError::NotFound(id))
    }

    /// List expenses, optionally for one project and category.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` if the project reference does not resolve
    /// - `InvalidCategory` for an unknown category
    pub async fn list_expenses(
        &self,
        project_ref: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, SpendError> {
        let category = category
            .map(|c| ExpenseCategory::parse(c).ok_or_else(|| SpendError::InvalidCategory(c.to_string())))
            .transpose()?;
        let project_id = match project_ref {
            Some(reference) => Some(resolve_project(&*self.projects, reference).await?.id),
            None => None,
        };

        self.expenses
            .list(ExpenseFilter {
                project_id,
                category,
            })
            .await
    }

    /// Correct the amount, description, or proof of an expense.
    ///
    /// Corrections never trigger threshold notifications.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the expense does not exist
    /// - `Validation` for a non-positive amount, blank description, or empty correction
    pub async fn correct_expense(
        &self,
        id: Uuid,
        input: CorrectExpenseInput,
    ) -> Result<Expense, SpendError> {
        if input.amount.is_none() && input.description.is_none() && input.proof_url.is_none() {
            return Err(SpendError::Validation(
                "nothing to correct".to_string(),
            ));
        }

        let mut expense = self.get_expense(id).await?;
        if let Some(amount) = input.amount {
            validate_amount(amount)?;
            expense.amount = amount;
        }
        if let Some(description) = input.description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(SpendError::Validation(
                    "description is required".to_string(),
                ));
            }
            expense.description = description;
        }
        if let Some(proof_url) = input.proof_url {
            expense.proof_url = Some(proof_url);
        }
        expense.updated_at = Utc::now();

        let expense = self.expenses.update(expense).await?;
        info!(expense_id = %id, amount = %expense.amount, "Expense corrected");
        Ok(expense)
    }

    /// Budget health of a project against its latest estimation.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project reference does not resolve.
    pub async fn get_budget_health(&self, project_ref: &str) -> Result<BudgetHealth, SpendError> {
        let project = resolve_project(&*self.projects, project_ref).await?;
        let estimation = self.estimations.latest_for_project(project.id).await?;
        let spent = self.expenses.totals_by_category(project.id).await?;

        Ok(budget_health(project.id, estimation.as_ref(), &spent))
    }
}

fn validate_amount(amount: Decimal) -> Result<(), SpendError> {
    if amount <= Decimal::ZERO {
        return Err(SpendError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
