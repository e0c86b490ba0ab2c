//! Quotation engine.
//!
//! Quotations are priced documents quoted against one estimation baseline.
//! Each `(project, estimate_version)` pair owns an append-only chain of
//! versions. Line and document totals are always recomputed here; a locked
//! row never changes and can only be superseded by a revision.

pub mod error;
pub mod lifecycle;
pub mod service;
pub mod totals;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::QuotationError;
pub use lifecycle::QuotationLifecycle;
pub use service::{QuotationRepository, QuotationService};
pub use totals::price_items;
pub use types::{
    ContingencyItem, CreateQuotationInput, LaborItem, MaterialItem, Quotation,
    QuotationContentInput, QuotationFilter, QuotationItems, QuotationStatus, QuotationTotals,
    ServiceItem, TaxItem,
};
