//! Expense repository for database operations.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{expenses, sea_orm_active_enums::ExpenseCategory as DbExpenseCategory};
use estimo_core::spend::{
    Expense, ExpenseCategory, ExpenseFilter, ExpenseRepository as ExpenseRepoTrait, SpendError,
};

/// Expense repository implementation.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Create a new expense repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ExpenseRepoTrait for ExpenseRepository {
    async fn insert(&self, expense: Expense) -> Result<Expense, SpendError> {
        let model = to_active_model(expense)
            .insert(&self.db)
            .await
            .map_err(|e| SpendError::Database(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, SpendError> {
        let model = expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SpendError::Database(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn update(&self, expense: Expense) -> Result<Expense, SpendError> {
        let id = expense.id;
        let model = to_active_model(expense)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => SpendError::NotFound(id),
                other => SpendError::Database(other.to_string()),
            })?;

        Ok(to_domain(model))
    }

    async fn list(&self, filter: ExpenseFilter) -> Result<Vec<Expense>, SpendError> {
        let mut query = expenses::Entity::find();

        if let Some(project_id) = filter.project_id {
            query = query.filter(expenses::Column::ProjectId.eq(project_id));
        }
        if let Some(category) = filter.category {
            query = query.filter(expenses::Column::Category.eq(to_db_category(category)));
        }

        let models = query
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| SpendError::Database(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn totals_by_category(
        &self,
        project_id: Uuid,
    ) -> Result<HashMap<ExpenseCategory, Decimal>, SpendError> {
        let rows: Vec<(DbExpenseCategory, Option<Decimal>)> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Category)
            .column_as(expenses::Column::Amount.sum(), "total")
            .filter(expenses::Column::ProjectId.eq(project_id))
            .group_by(expenses::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SpendError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(category, total)| (from_db_category(category), total.unwrap_or_default()))
            .collect())
    }
}

/// Convert domain expense category to database enum.
fn to_db_category(category: ExpenseCategory) -> DbExpenseCategory {
    match category {
        ExpenseCategory::Labor => DbExpenseCategory::Labor,
        ExpenseCategory::Procurement => DbExpenseCategory::Procurement,
        ExpenseCategory::Transport => DbExpenseCategory::Transport,
        ExpenseCategory::Misc => DbExpenseCategory::Misc,
    }
}

/// Convert database enum to domain expense category.
pub(crate) fn from_db_category(category: DbExpenseCategory) -> ExpenseCategory {
    match category {
        DbExpenseCategory::Labor => ExpenseCategory::Labor,
        DbExpenseCategory::Procurement => ExpenseCategory::Procurement,
        DbExpenseCategory::Transport => ExpenseCategory::Transport,
        DbExpenseCategory::Misc => ExpenseCategory::Misc,
    }
}

fn to_active_model(expense: Expense) -> expenses::ActiveModel {
    expenses::ActiveModel {
        id: Set(expense.id),
        project_id: Set(expense.project_id),
        category: Set(to_db_category(expense.category)),
        amount: Set(expense.amount),
        description: Set(expense.description),
        proof_url: Set(expense.proof_url),
        created_by: Set(expense.created_by),
        created_at: Set(expense.created_at.into()),
        updated_at: Set(expense.updated_at.into()),
    }
}

/// Convert a database row to the domain expense.
pub(crate) fn to_domain(model: expenses::Model) -> Expense {
    Expense {
        id: model.id,
        project_id: model.project_id,
        category: from_db_category(model.category),
        amount: model.amount,
        description: model.description,
        proof_url: model.proof_url,
        created_by: model.created_by,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}
