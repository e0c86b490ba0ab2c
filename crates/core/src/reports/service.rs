//! Monthly report generation service.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use super::cache::ReportCache;
use super::error::ReportError;
use super::types::{
    ExpenseSection, IncomeSection, MonthlyReport, MonthlyReportData, PurchaseOrderSection,
    ReportAlerts, ReportPeriod, VarianceLine,
};
use crate::spend::{
    AT_RISK_THRESHOLD, ExpenseCategory, OVER_BUDGET_THRESHOLD, classify,
    report_percentage, spend_percentage,
};

/// Payment status counted towards high-value pending alerts.
const PENDING_STATUS: &str = "pending";

/// Loads the ledger data a monthly report aggregates.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait MonthlyReportSource: Send + Sync {
    /// Read everything needed for `period`.
    fn load_month(
        &self,
        period: ReportPeriod,
    ) -> impl std::future::Future<Output = Result<MonthlyReportData, ReportError>> + Send;
}

/// Pure monthly aggregation.
pub struct ReportService;

impl ReportService {
    /// Aggregate a month of data into a report.
    #[must_use]
    pub fn build_monthly_report(
        period: ReportPeriod,
        data: &MonthlyReportData,
        high_value_threshold: Decimal,
        generated_at: DateTime<Utc>,
    ) -> MonthlyReport {
        let budget_variance = Self::budget_variance(data);
        let alerts = Self::alerts(&budget_variance, data, high_value_threshold);

        MonthlyReport {
            period,
            generated_at,
            income: Self::income(data),
            expenses: Self::expenses(data),
            budget_variance,
            payments: count_by(data.payments.iter().map(|p| p.status.to_lowercase())),
            quotations: count_by(data.quotation_statuses.iter().map(|s| s.as_str().to_string())),
            estimations: count_by(
                data.estimation_statuses
                    .iter()
                    .map(|s| s.as_str().to_string()),
            ),
            purchase_orders: Self::purchase_orders(data),
            alerts,
        }
    }

    fn income(data: &MonthlyReportData) -> IncomeSection {
        let mut section = IncomeSection::default();
        for income in &data.incomes {
            section.total += income.amount;
            *section
                .by_type
                .entry(income.income_type.clone())
                .or_default() += income.amount;
            *section.by_method.entry(income.method.clone()).or_default() += income.amount;
        }
        section
    }

    fn expenses(data: &MonthlyReportData) -> ExpenseSection {
        let mut section = ExpenseSection::default();
        for expense in &data.expenses {
            section.total += expense.amount;
            *section.by_category.entry(expense.category).or_default() += expense.amount;
            *section.by_project.entry(expense.project_id).or_default() += expense.amount;
        }
        section
    }

    /// One line per project category with a budget or spend.
    ///
    /// Projects are ordered by id, categories in budget field order.
    fn budget_variance(data: &MonthlyReportData) -> Vec<VarianceLine> {
        let estimations: HashMap<Uuid, _> = data
            .latest_estimations
            .iter()
            .map(|e| (e.project_id, e))
            .collect();
        let projects: BTreeSet<Uuid> = estimations
            .keys()
            .chain(data.cumulative_spend.keys())
            .copied()
            .collect();

        let mut lines = Vec::new();
        for project_id in projects {
            let spend = data.cumulative_spend.get(&project_id);
            for category in ExpenseCategory::ALL {
                let budget = estimations
                    .get(&project_id)
                    .map_or(Decimal::ZERO, |e| e.budget_for(category.budget_category()));
                let actual = spend
                    .and_then(|s| s.get(&category))
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                if budget.is_zero() && actual.is_zero() {
                    continue;
                }

                let percentage = spend_percentage(actual, budget);
                lines.push(VarianceLine {
                    project_id,
                    category,
                    budget,
                    actual,
                    variance: budget - actual,
                    percentage: report_percentage(percentage),
                    status: classify(percentage),
                });
            }
        }
        lines
    }

    fn purchase_orders(data: &MonthlyReportData) -> PurchaseOrderSection {
        PurchaseOrderSection {
            count: data.purchase_orders.len() as u64,
            total_amount: data.purchase_orders.iter().map(|p| p.total_amount).sum(),
            by_status: count_by(data.purchase_orders.iter().map(|p| p.status.to_lowercase())),
        }
    }

    fn alerts(
        variance: &[VarianceLine],
        data: &MonthlyReportData,
        high_value_threshold: Decimal,
    ) -> ReportAlerts {
        // Thresholds are checked on the exact ratio, not the rounded one.
        let exact = |line: &VarianceLine| spend_percentage(line.actual, line.budget);

        let categories_at_risk = variance
            .iter()
            .filter(|line| exact(line) >= AT_RISK_THRESHOLD)
            .count() as u64;
        let over_budget_projects = variance
            .iter()
            .filter(|line| exact(line) > OVER_BUDGET_THRESHOLD)
            .map(|line| line.project_id)
            .collect::<BTreeSet<_>>()
            .len() as u64;
        let high_value_pending_payments = data
            .payments
            .iter()
            .filter(|p| p.status.eq_ignore_ascii_case(PENDING_STATUS))
            .filter(|p| p.amount >= high_value_threshold)
            .count() as u64;

        ReportAlerts {
            categories_at_risk,
            over_budget_projects,
            high_value_pending_payments,
        }
    }
}

fn count_by(keys: impl Iterator<Item = String>) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Monthly report service with caching of closed months.
pub struct MonthlyReportService<S: MonthlyReportSource> {
    source: Arc<S>,
    cache: ReportCache,
    high_value_threshold: Decimal,
}

impl<S: MonthlyReportSource> MonthlyReportService<S> {
    /// Create a new monthly report service.
    #[must_use]
    pub fn new(source: Arc<S>, cache: ReportCache, high_value_threshold: Decimal) -> Self {
        Self {
            source,
            cache,
            high_value_threshold,
        }
    }

    /// Report for a calendar month.
    ///
    /// Reports for months that have fully elapsed are served from cache; the
    /// current and future months are always recomputed.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` for a month outside 1..=12
    /// - `Database` if source data cannot be read
    pub async fn monthly_report(&self, year: i32, month: u32) -> Result<MonthlyReport, ReportError> {
        let period = ReportPeriod::new(year, month)?;
        let now = Utc::now();
        let closed = period.is_closed(now);

        if closed {
            if let Some(report) = self.cache.get(period) {
                debug!(year, month, "Monthly report served from cache");
                return Ok(report);
            }
        }

        let data = self.source.load_month(period).await?;
        let report =
            ReportService::build_monthly_report(period, &data, self.high_value_threshold, now);

        if closed {
            self.cache.insert(period, report.clone());
        }
        info!(
            year,
            month,
            expenses = %report.expenses.total,
            income = %report.income.total,
            over_budget_projects = report.alerts.over_budget_projects,
            "Monthly report generated"
        );
        Ok(report)
    }

    /// Drop all cached reports.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}
