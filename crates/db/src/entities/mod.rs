//! `SeaORM` entity definitions.

pub mod prelude;

pub mod estimations;
pub mod expenses;
pub mod finance_summary;
pub mod incomes;
pub mod materials;
pub mod notifications;
pub mod payments;
pub mod projects;
pub mod purchase_orders;
pub mod quotations;
pub mod sea_orm_active_enums;
