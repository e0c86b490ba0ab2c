//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for projects, estimations, quotations, expenses,
//!   the finance summary, and monthly reports
//! - The actor extractor for the `x-actor-id` header
//! - Error rendering for domain errors

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use estimo_core::artifact::StorageArtifactGenerator;
use estimo_core::estimation::EstimationService;
use estimo_core::finance::FinanceService;
use estimo_core::project::ProjectService;
use estimo_core::quotation::QuotationService;
use estimo_core::reports::{MonthlyReportService, ReportCache};
use estimo_core::spend::SpendService;
use estimo_db::{
    EstimationRepository, ExpenseRepository, FinanceSummaryRepository, MaterialRepository,
    NotificationRepository, ProjectRepository, QuotationRepository, ReportRepository,
};
use estimo_shared::FinanceConfig;

/// Closed months kept in the report cache.
const REPORT_CACHE_MONTHS: u64 = 120;

/// Quotation service wired to the database.
pub type DbQuotationService = QuotationService<
    QuotationRepository,
    EstimationRepository,
    ProjectRepository,
    StorageArtifactGenerator,
    MaterialRepository,
>;

/// Spend service wired to the database.
pub type DbSpendService =
    SpendService<ExpenseRepository, EstimationRepository, ProjectRepository, NotificationRepository>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Alerting and reporting settings.
    pub finance: Arc<FinanceConfig>,
    /// Quotation document generator.
    pub artifacts: Arc<StorageArtifactGenerator>,
    /// Cache of closed-month reports.
    pub report_cache: ReportCache,
}

impl AppState {
    /// Build state with a report cache sized by the finance settings.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        finance: FinanceConfig,
        artifacts: StorageArtifactGenerator,
    ) -> Self {
        let report_cache = ReportCache::with_config(REPORT_CACHE_MONTHS, finance.report_cache_ttl_secs);
        Self {
            db: Arc::new(db),
            finance: Arc::new(finance),
            artifacts: Arc::new(artifacts),
            report_cache,
        }
    }

    fn projects(&self) -> Arc<ProjectRepository> {
        Arc::new(ProjectRepository::new((*self.db).clone()))
    }

    fn estimations(&self) -> Arc<EstimationRepository> {
        Arc::new(EstimationRepository::new((*self.db).clone()))
    }

    /// Project service.
    #[must_use]
    pub fn project_service(&self) -> ProjectService<ProjectRepository> {
        ProjectService::new(self.projects())
    }

    /// Estimation service.
    #[must_use]
    pub fn estimation_service(&self) -> EstimationService<EstimationRepository, ProjectRepository> {
        EstimationService::new(self.estimations(), self.projects())
    }

    /// Quotation service.
    #[must_use]
    pub fn quotation_service(&self) -> DbQuotationService {
        QuotationService::new(
            Arc::new(QuotationRepository::new((*self.db).clone())),
            self.estimations(),
            self.projects(),
            self.artifacts.clone(),
            Arc::new(MaterialRepository::new((*self.db).clone())),
        )
        .with_artifact_timeout(Duration::from_secs(self.finance.artifact_timeout_secs))
    }

    /// Spend service.
    #[must_use]
    pub fn spend_service(&self) -> DbSpendService {
        SpendService::new(
            Arc::new(ExpenseRepository::new((*self.db).clone())),
            self.estimations(),
            self.projects(),
            Arc::new(NotificationRepository::new((*self.db).clone())),
            self.finance.finance_roles.clone(),
        )
    }

    /// Finance summary service.
    #[must_use]
    pub fn finance_service(&self) -> FinanceService<FinanceSummaryRepository> {
        FinanceService::new(Arc::new(FinanceSummaryRepository::new((*self.db).clone())))
    }

    /// Monthly report service sharing the state's cache.
    #[must_use]
    pub fn report_service(&self) -> MonthlyReportService<ReportRepository> {
        MonthlyReportService::new(
            Arc::new(ReportRepository::new((*self.db).clone())),
            self.report_cache.clone(),
            self.finance.high_value_payment_threshold,
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
