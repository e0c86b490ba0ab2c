//! Core business logic for Estimo.
//!
//! This crate contains the financial estimation and quotation engine with ZERO
//! web or database dependencies. Persistence and delivery collaborators are
//! expressed as traits that the db and api crates implement.
//!
//! # Modules
//!
//! - `project` - Project directory and reference resolution
//! - `estimation` - Versioned budget baselines per project
//! - `quotation` - Versioned, lockable price quotations
//! - `spend` - Expense tracking, budget health, and threshold alerts
//! - `finance` - The running finance summary ledger
//! - `notification` - Notification fanout contract
//! - `catalog` - Material catalog lookups for quotation items
//! - `artifact` - Quotation document generation
//! - `storage` - Object storage for generated documents
//! - `reports` - Monthly financial aggregation

pub mod artifact;
pub mod catalog;
pub mod estimation;
pub mod finance;
pub mod notification;
pub mod project;
pub mod quotation;
pub mod reports;
pub mod spend;
pub mod storage;
pub mod versioning;

#[cfg(test)]
pub(crate) mod testing;
