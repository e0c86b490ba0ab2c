//! Finance summary repository.
//!
//! The summary is a single row created on first access. Deltas are applied
//! by one `UPDATE ... SET col = col + $1 RETURNING *` statement, so
//! concurrent writers never lose each other's updates.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::{Expr, OnConflict},
};

use crate::entities::finance_summary::{self, SINGLETON_ID};
use estimo_core::finance::{FinanceError, FinanceLedger, FinanceSummary};

/// Finance summary repository implementation.
#[derive(Debug, Clone)]
pub struct FinanceSummaryRepository {
    db: DatabaseConnection,
}

impl FinanceSummaryRepository {
    /// Create a new finance summary repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert the zeroed singleton row unless it already exists.
    async fn ensure_row(&self) -> Result<(), FinanceError> {
        let active_model = finance_summary::ActiveModel {
            id: Set(SINGLETON_ID),
            total_income: Set(Decimal::ZERO),
            total_balance: Set(Decimal::ZERO),
            updated_at: Set(Utc::now().into()),
        };

        finance_summary::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(finance_summary::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| FinanceError::Database(e.to_string()))?;

        Ok(())
    }
}

impl FinanceLedger for FinanceSummaryRepository {
    async fn summary(&self) -> Result<FinanceSummary, FinanceError> {
        self.ensure_row().await?;

        let model = finance_summary::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(|e| FinanceError::Database(e.to_string()))?
            .ok_or_else(|| FinanceError::Database("finance summary row missing".to_string()))?;

        Ok(to_domain(model))
    }

    async fn apply_delta(
        &self,
        income_delta: Decimal,
        balance_delta: Decimal,
    ) -> Result<FinanceSummary, FinanceError> {
        self.ensure_row().await?;

        let models = finance_summary::Entity::update_many()
            .col_expr(
                finance_summary::Column::TotalIncome,
                Expr::col(finance_summary::Column::TotalIncome).add(income_delta),
            )
            .col_expr(
                finance_summary::Column::TotalBalance,
                Expr::col(finance_summary::Column::TotalBalance).add(balance_delta),
            )
            .col_expr(finance_summary::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(finance_summary::Column::Id.eq(SINGLETON_ID))
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| FinanceError::Database(e.to_string()))?;

        models
            .into_iter()
            .next()
            .map(to_domain)
            .ok_or_else(|| FinanceError::Database("finance summary row missing".to_string()))
    }
}

fn to_domain(model: finance_summary::Model) -> FinanceSummary {
    FinanceSummary {
        total_income: model.total_income,
        total_balance: model.total_balance,
        updated_at: model.updated_at.into(),
    }
}
