//! Entity re-exports.

pub use super::estimations::Entity as Estimations;
pub use super::expenses::Entity as Expenses;
pub use super::finance_summary::Entity as FinanceSummary;
pub use super::incomes::Entity as Incomes;
pub use super::materials::Entity as Materials;
pub use super::notifications::Entity as Notifications;
pub use super::payments::Entity as Payments;
pub use super::projects::Entity as Projects;
pub use super::purchase_orders::Entity as PurchaseOrders;
pub use super::quotations::Entity as Quotations;
