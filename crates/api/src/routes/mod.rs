//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod estimations;
pub mod expenses;
pub mod finance;
pub mod health;
pub mod projects;
pub mod quotations;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(projects::routes())
        .merge(estimations::routes())
        .merge(quotations::routes())
        .merge(expenses::routes())
        .merge(finance::routes())
        .merge(reports::routes())
}
