//! Quotation domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Quotation status.
///
/// Status is tracked per row, not per lineage:
/// - Draft → Sent (send)
/// - Draft | Sent | Revised → Confirmed + locked (lock)
/// - Revised only labels a row created by revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    /// Freshly created.
    Draft,
    /// Delivered to the client.
    Sent,
    /// Created by revising an earlier version.
    Revised,
    /// Accepted and locked.
    Confirmed,
    /// Legacy label for locked rows.
    Locked,
}

impl QuotationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Revised => "revised",
            Self::Confirmed => "confirmed",
            Self::Locked => "locked",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "revised" => Some(Self::Revised),
            "confirmed" => Some(Self::Confirmed),
            "locked" => Some(Self::Locked),
            _ => None,
        }
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A labor line. `total` is derived as `hours × rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborItem {
    /// Task name.
    pub task: String,
    /// Hours of work.
    pub hours: Decimal,
    /// Hourly rate.
    pub rate: Decimal,
    /// Derived line total. Any caller-supplied value is ignored.
    #[serde(default)]
    pub total: Decimal,
}

/// A material line. `total` is derived as `quantity × unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialItem {
    /// Catalog reference.
    #[serde(default)]
    pub material_id: Option<Uuid>,
    /// Description, resolved from the catalog when possible.
    #[serde(default)]
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Derived line total. Any caller-supplied value is ignored.
    #[serde(default)]
    pub total: Decimal,
}

/// A service line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Service name.
    pub service: String,
    /// Cost.
    pub cost: Decimal,
}

/// A contingency line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyItem {
    /// Description.
    pub description: String,
    /// Amount.
    pub amount: Decimal,
}

/// A tax line.
///
/// When `percentage` is set, `amount` is derived from the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxItem {
    /// Description.
    pub description: String,
    /// Rate applied to the subtotal, in percent.
    #[serde(default)]
    pub percentage: Option<Decimal>,
    /// Tax amount.
    #[serde(default)]
    pub amount: Decimal,
}

/// Itemized content of a quotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotationItems {
    /// Labor lines.
    pub labor_items: Vec<LaborItem>,
    /// Material lines.
    pub material_items: Vec<MaterialItem>,
    /// Service lines.
    pub service_items: Vec<ServiceItem>,
    /// Contingency lines.
    pub contingency_items: Vec<ContingencyItem>,
    /// Tax lines.
    pub tax_items: Vec<TaxItem>,
}

/// Derived totals of a quotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationTotals {
    /// Labor + material + service.
    pub subtotal: Decimal,
    /// Sum of contingency amounts.
    pub total_contingency: Decimal,
    /// Sum of tax amounts.
    pub total_tax: Decimal,
    /// `subtotal + total_contingency + total_tax`.
    pub grand_total: Decimal,
}

/// A quotation version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    /// Quotation ID.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Estimation version this quotation prices against.
    pub estimate_version: i32,
    /// Version within `(project_id, estimate_version)`, starting at 1.
    pub version: i32,
    /// Row status.
    pub status: QuotationStatus,
    /// Once set, the row never changes.
    pub locked: bool,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// Line items.
    #[serde(flatten)]
    pub items: QuotationItems,
    /// Derived totals.
    #[serde(flatten)]
    pub totals: QuotationTotals,
    /// Generated document, if any.
    pub artifact_url: Option<String>,
    /// Last recipient.
    pub sent_to: Option<String>,
    /// Last send time.
    pub sent_at: Option<DateTime<Utc>>,
    /// Lock time.
    pub locked_at: Option<DateTime<Utc>>,
    /// Author of the lineage.
    pub created_by: Option<Uuid>,
    /// Last editor.
    pub updated_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating the next quotation version.
#[derive(Debug, Clone)]
pub struct CreateQuotationInput {
    /// Project id or business key.
    pub project_ref: String,
    /// Baseline to quote against; defaults to the latest estimation.
    pub estimate_version: Option<i32>,
    /// Line items.
    pub items: QuotationItems,
    /// Remarks.
    pub remarks: Option<String>,
    /// Author.
    pub created_by: Option<Uuid>,
}

/// Replacement content for update and revise.
///
/// Items are replaced in full; `remarks: None` keeps the prior remarks.
#[derive(Debug, Clone, Default)]
pub struct QuotationContentInput {
    /// Line items.
    pub items: QuotationItems,
    /// Remarks.
    pub remarks: Option<String>,
    /// Editor.
    pub updated_by: Option<Uuid>,
}

/// Filter for listing quotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotationFilter {
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one baseline.
    pub estimate_version: Option<i32>,
    /// Restrict to one status.
    pub status: Option<QuotationStatus>,
    /// Created at or after.
    pub created_from: Option<DateTime<Utc>>,
    /// Created at or before.
    pub created_to: Option<DateTime<Utc>>,
}

impl QuotationFilter {
    /// Returns true if the quotation passes every set criterion.
    #[must_use]
    pub fn matches(&self, quotation: &Quotation) -> bool {
        self.project_id.is_none_or(|id| quotation.project_id == id)
            && self
                .estimate_version
                .is_none_or(|v| quotation.estimate_version == v)
            && self.status.is_none_or(|s| quotation.status == s)
            && self.created_from.is_none_or(|t| quotation.created_at >= t)
            && self.created_to.is_none_or(|t| quotation.created_at <= t)
    }
}
