//! Running finance summary.
//!
//! A single process-wide row of `total_income` and `total_balance`. All
//! mutation goes through atomic deltas applied by the store; callers never
//! read, modify, and write it back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// The finance summary singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceSummary {
    /// Cumulative approved income.
    pub total_income: Decimal,
    /// Current balance.
    pub total_balance: Decimal,
    /// Last mutation.
    pub updated_at: DateTime<Utc>,
}

/// Errors from the finance summary.
#[derive(Debug, Error)]
pub enum FinanceError {
    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl FinanceError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Atomic access to the finance summary.
///
/// Implementations must create the row lazily and apply every delta in a
/// single atomic statement.
pub trait FinanceLedger: Send + Sync {
    /// Read the summary, creating it with zero totals if absent.
    fn summary(
        &self,
    ) -> impl std::future::Future<Output = Result<FinanceSummary, FinanceError>> + Send;

    /// Atomically add deltas to both totals and return the new state.
    fn apply_delta(
        &self,
        income_delta: Decimal,
        balance_delta: Decimal,
    ) -> impl std::future::Future<Output = Result<FinanceSummary, FinanceError>> + Send;
}

/// Finance summary service.
pub struct FinanceService<L: FinanceLedger> {
    ledger: Arc<L>,
}

impl<L: FinanceLedger> FinanceService<L> {
    /// Create a new finance service.
    #[must_use]
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Current summary.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the summary row cannot be read or created.
    pub async fn get_summary(&self) -> Result<FinanceSummary, FinanceError> {
        self.ledger.summary().await
    }

    /// Shift the balance by `delta`, which may be negative.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero delta.
    pub async fn adjust_balance(&self, delta: Decimal) -> Result<FinanceSummary, FinanceError> {
        if delta.is_zero() {
            return Err(FinanceError::Validation(
                "delta must not be zero".to_string(),
            ));
        }
        let summary = self.ledger.apply_delta(Decimal::ZERO, delta).await?;
        info!(delta = %delta, balance = %summary.total_balance, "Balance adjusted");
        Ok(summary)
    }

    /// Record approved income: raises income and balance together.
    ///
    /// # Errors
    ///
    /// Returns `Validation` unless `amount > 0`.
    pub async fn increment_income(&self, amount: Decimal) -> Result<FinanceSummary, FinanceError> {
        validate_positive(amount)?;
        let summary = self.ledger.apply_delta(amount, amount).await?;
        info!(amount = %amount, income = %summary.total_income, "Income incremented");
        Ok(summary)
    }

    /// Reverse previously recorded income: lowers income and balance together.
    ///
    /// # Errors
    ///
    /// Returns `Validation` unless `amount > 0`.
    pub async fn decrement_income(&self, amount: Decimal) -> Result<FinanceSummary, FinanceError> {
        validate_positive(amount)?;
        let summary = self.ledger.apply_delta(-amount, -amount).await?;
        info!(amount = %amount, income = %summary.total_income, "Income decremented");
        Ok(summary)
    }
}

fn validate_positive(amount: Decimal) -> Result<(), FinanceError> {
    if amount <= Decimal::ZERO {
        return Err(FinanceError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
