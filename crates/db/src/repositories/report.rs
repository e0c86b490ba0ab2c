//! Monthly report data source.
//!
//! Loads every input of a monthly report for one calendar window. All
//! aggregation happens in `estimo-core`; this module only reads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use super::estimation::{
    from_db_status as from_db_estimation_status, to_domain as estimation_to_domain,
};
use super::expense::{from_db_category, to_domain as expense_to_domain};
use super::quotation::from_db_status as from_db_quotation_status;
use crate::entities::{
    estimations, expenses, incomes, payments, purchase_orders, quotations,
    sea_orm_active_enums::{
        EstimationStatus as DbEstimationStatus, ExpenseCategory as DbExpenseCategory,
        QuotationStatus as DbQuotationStatus,
    },
};
use estimo_core::estimation::Estimation;
use estimo_core::reports::{
    IncomeRecord, MonthlyReportData, MonthlyReportSource, PaymentRecord, PurchaseOrderRecord,
    ReportError, ReportPeriod,
};
use estimo_core::spend::ExpenseCategory;

/// Income status counted as received.
const APPROVED_INCOME_STATUS: &str = "approved";

/// Report repository implementation.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn incomes(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IncomeRecord>, ReportError> {
        let models = incomes::Entity::find()
            .filter(incomes::Column::Status.eq(APPROVED_INCOME_STATUS))
            .filter(incomes::Column::ReceivedAt.gte(start))
            .filter(incomes::Column::ReceivedAt.lt(end))
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| IncomeRecord {
                amount: m.amount,
                income_type: m.income_type,
                method: m.method,
            })
            .collect())
    }

    async fn cumulative_spend(
        &self,
        end: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, HashMap<ExpenseCategory, Decimal>>, ReportError> {
        let rows: Vec<(Uuid, DbExpenseCategory, Option<Decimal>)> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::ProjectId)
            .column(expenses::Column::Category)
            .column_as(expenses::Column::Amount.sum(), "total")
            .filter(expenses::Column::CreatedAt.lt(end))
            .group_by(expenses::Column::ProjectId)
            .group_by(expenses::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let mut spend: HashMap<Uuid, HashMap<ExpenseCategory, Decimal>> = HashMap::new();
        for (project_id, category, total) in rows {
            spend
                .entry(project_id)
                .or_default()
                .insert(from_db_category(category), total.unwrap_or_default());
        }
        Ok(spend)
    }

    async fn latest_estimations(
        &self,
        end: DateTime<Utc>,
    ) -> Result<Vec<Estimation>, ReportError> {
        let models = estimations::Entity::find()
            .filter(estimations::Column::CreatedAt.lt(end))
            .order_by_asc(estimations::Column::ProjectId)
            .order_by_desc(estimations::Column::Version)
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let mut latest = Vec::new();
        let mut last_project = None;
        for model in models {
            if last_project != Some(model.project_id) {
                last_project = Some(model.project_id);
                latest.push(estimation_to_domain(model));
            }
        }
        Ok(latest)
    }
}

impl MonthlyReportSource for ReportRepository {
    async fn load_month(&self, period: ReportPeriod) -> Result<MonthlyReportData, ReportError> {
        let start = period.start();
        let end = period.end();

        let incomes = self.incomes(start, end).await?;

        let expenses = expenses::Entity::find()
            .filter(expenses::Column::CreatedAt.gte(start))
            .filter(expenses::Column::CreatedAt.lt(end))
            .order_by_asc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?
            .into_iter()
            .map(expense_to_domain)
            .collect();

        let cumulative_spend = self.cumulative_spend(end).await?;
        let latest_estimations = self.latest_estimations(end).await?;

        let payments = payments::Entity::find()
            .filter(payments::Column::CreatedAt.gte(start))
            .filter(payments::Column::CreatedAt.lt(end))
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?
            .into_iter()
            .map(|m| PaymentRecord {
                id: m.id,
                amount: m.amount,
                status: m.status,
            })
            .collect();

        let quotation_statuses: Vec<DbQuotationStatus> = quotations::Entity::find()
            .select_only()
            .column(quotations::Column::Status)
            .filter(quotations::Column::CreatedAt.gte(start))
            .filter(quotations::Column::CreatedAt.lt(end))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let estimation_statuses: Vec<DbEstimationStatus> = estimations::Entity::find()
            .select_only()
            .column(estimations::Column::Status)
            .filter(estimations::Column::CreatedAt.gte(start))
            .filter(estimations::Column::CreatedAt.lt(end))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let purchase_orders = purchase_orders::Entity::find()
            .filter(purchase_orders::Column::CreatedAt.gte(start))
            .filter(purchase_orders::Column::CreatedAt.lt(end))
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?
            .into_iter()
            .map(|m| PurchaseOrderRecord {
                id: m.id,
                total_amount: m.total_amount,
                status: m.status,
            })
            .collect();

        Ok(MonthlyReportData {
            incomes,
            expenses,
            cumulative_spend,
            latest_estimations,
            payments,
            quotation_statuses: quotation_statuses
                .into_iter()
                .map(from_db_quotation_status)
                .collect(),
            estimation_statuses: estimation_statuses
                .into_iter()
                .map(from_db_estimation_status)
                .collect(),
            purchase_orders,
        })
    }
}
