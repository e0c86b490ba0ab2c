//! Monthly report types.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ReportError;
use crate::estimation::{Estimation, EstimationStatus};
use crate::quotation::QuotationStatus;
use crate::spend::{Expense, ExpenseCategory, HealthStatus};

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// Year.
    pub year: i32,
    /// Month, 1 to 12.
    pub month: u32,
}

impl ReportPeriod {
    /// Validate a year and month.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` for a month outside 1..=12 or an
    /// unrepresentable year.
    pub fn new(year: i32, month: u32) -> Result<Self, ReportError> {
        if !(1..=12).contains(&month) {
            return Err(ReportError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ReportError::InvalidPeriod(format!("year {year} out of range")));
        }
        Ok(Self { year, month })
    }

    /// First instant of the month.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        month_start(self.year, self.month)
    }

    /// First instant of the following month.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        if self.month == 12 {
            month_start(self.year + 1, 1)
        } else {
            month_start(self.year, self.month + 1)
        }
    }

    /// True once the whole month lies in the past.
    #[must_use]
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.end() <= now
    }

    /// Period containing `at`.
    #[must_use]
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// An approved income in the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRecord {
    /// Amount.
    pub amount: Decimal,
    /// Income type, e.g. `project_payment`.
    pub income_type: String,
    /// Payment method, e.g. `bank_transfer`.
    pub method: String,
}

/// A payment created in the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment ID.
    pub id: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// Status, e.g. `pending`, `paid`.
    pub status: String,
}

/// A purchase order created in the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderRecord {
    /// Purchase order ID.
    pub id: Uuid,
    /// Order total.
    pub total_amount: Decimal,
    /// Status.
    pub status: String,
}

/// Everything a monthly report reads.
#[derive(Debug, Clone, Default)]
pub struct MonthlyReportData {
    /// Approved incomes received in the window.
    pub incomes: Vec<IncomeRecord>,
    /// Expenses recorded in the window.
    pub expenses: Vec<Expense>,
    /// Spend per project and category through the end of the window.
    pub cumulative_spend: HashMap<Uuid, HashMap<ExpenseCategory, Decimal>>,
    /// Latest estimation per project, as of the end of the window.
    pub latest_estimations: Vec<Estimation>,
    /// Payments created in the window.
    pub payments: Vec<PaymentRecord>,
    /// Statuses of quotations created in the window.
    pub quotation_statuses: Vec<QuotationStatus>,
    /// Statuses of estimations created in the window.
    pub estimation_statuses: Vec<EstimationStatus>,
    /// Purchase orders created in the window.
    pub purchase_orders: Vec<PurchaseOrderRecord>,
}

/// Income section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSection {
    /// Total approved income.
    pub total: Decimal,
    /// Totals per income type.
    pub by_type: BTreeMap<String, Decimal>,
    /// Totals per payment method.
    pub by_method: BTreeMap<String, Decimal>,
}

/// Expense section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSection {
    /// Total spend in the window.
    pub total: Decimal,
    /// Totals per category.
    pub by_category: BTreeMap<ExpenseCategory, Decimal>,
    /// Totals per project.
    pub by_project: BTreeMap<Uuid, Decimal>,
}

/// Budget vs actual for one project category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceLine {
    /// Project.
    pub project_id: Uuid,
    /// Expense category.
    pub category: ExpenseCategory,
    /// Budget from the latest estimation.
    pub budget: Decimal,
    /// Cumulative spend.
    pub actual: Decimal,
    /// `budget - actual`.
    pub variance: Decimal,
    /// Spend percentage, 1 decimal place.
    pub percentage: Decimal,
    /// Classification.
    pub status: HealthStatus,
}

/// Purchase order section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderSection {
    /// Number of orders.
    pub count: u64,
    /// Sum of order totals.
    pub total_amount: Decimal,
    /// Counts per status.
    pub by_status: BTreeMap<String, u64>,
}

/// Composite alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAlerts {
    /// Project categories at or above 80%.
    pub categories_at_risk: u64,
    /// Projects with any category above 100%.
    pub over_budget_projects: u64,
    /// Pending payments at or above the high-value threshold.
    pub high_value_pending_payments: u64,
}

/// The monthly financial report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Period covered.
    pub period: ReportPeriod,
    /// Generation time.
    pub generated_at: DateTime<Utc>,
    /// Income.
    pub income: IncomeSection,
    /// Expenses.
    pub expenses: ExpenseSection,
    /// Budget variance per project category.
    pub budget_variance: Vec<VarianceLine>,
    /// Payment counts per status.
    pub payments: BTreeMap<String, u64>,
    /// Quotation counts per status.
    pub quotations: BTreeMap<String, u64>,
    /// Estimation counts per status.
    pub estimations: BTreeMap<String, u64>,
    /// Purchase orders.
    pub purchase_orders: PurchaseOrderSection,
    /// Alerts.
    pub alerts: ReportAlerts,
}
