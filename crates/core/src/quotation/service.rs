//! Quotation service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use estimo_shared::types::{PageRequest, PageResponse};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::QuotationError;
use super::lifecycle::QuotationLifecycle;
use super::totals::price_items;
use super::types::{
    CreateQuotationInput, Quotation, QuotationContentInput, QuotationFilter, QuotationItems,
    QuotationStatus, QuotationTotals,
};
use crate::artifact::ArtifactGenerator;
use crate::catalog::{MaterialCatalog, resolve_description};
use crate::estimation::EstimationRepository;
use crate::project::{ProjectDirectory, resolve_project};
use crate::versioning::{MAX_VERSION_ATTEMPTS, next_version};

/// Default bound on document generation.
pub const DEFAULT_ARTIFACT_TIMEOUT: Duration = Duration::from_secs(10);

/// Repository trait for quotation persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait QuotationRepository: Send + Sync {
    /// Highest version in a lineage.
    fn latest_version(
        &self,
        project_id: Uuid,
        estimate_version: i32,
    ) -> impl std::future::Future<Output = Result<Option<i32>, QuotationError>> + Send;

    /// Insert a new row.
    ///
    /// Must fail with `VersionConflict` if
    /// `(project_id, estimate_version, version)` exists.
    fn insert(
        &self,
        quotation: Quotation,
    ) -> impl std::future::Future<Output = Result<Quotation, QuotationError>> + Send;

    /// Find quotation by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Quotation>, QuotationError>> + Send;

    /// Replace items, totals, remarks, and editor of an unlocked row.
    ///
    /// No other column is written. Must fail with `Locked` if the stored row
    /// is locked and `NotFound` if it does not exist.
    fn update_content(
        &self,
        quotation: Quotation,
    ) -> impl std::future::Future<Output = Result<Quotation, QuotationError>> + Send;

    /// Record a delivery and return the stored row.
    ///
    /// Stamps `sent_to` and `sent_at`; the status becomes `Sent` only while
    /// the stored row is unlocked.
    fn mark_sent(
        &self,
        id: Uuid,
        sent_to: String,
        sent_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Quotation, QuotationError>> + Send;

    /// Confirm and lock a row that is still unlocked.
    ///
    /// Touches only the lock columns. Returns `None` if the row was already
    /// locked and `NotFound` if it does not exist.
    fn lock(
        &self,
        id: Uuid,
        locked_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<Quotation>, QuotationError>> + Send;

    /// Attach a generated document to an unlocked row.
    ///
    /// Returns false, leaving the row as it is, if the row is locked.
    fn set_artifact_url(
        &self,
        id: Uuid,
        url: String,
    ) -> impl std::future::Future<Output = Result<bool, QuotationError>> + Send;

    /// Filtered page of quotations, newest first, with the total match count.
    fn list(
        &self,
        filter: QuotationFilter,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<Quotation>, u64), QuotationError>> + Send;

    /// Every matching row, ordered by estimate version then version ascending.
    fn list_versions(
        &self,
        filter: QuotationFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Quotation>, QuotationError>> + Send;
}

/// Quotation service.
///
/// Owns version assignment, pricing, locking, and best-effort document
/// generation.
pub struct QuotationService<Q, E, P, A, C>
where
    Q: QuotationRepository,
    E: EstimationRepository,
    P: ProjectDirectory,
    A: ArtifactGenerator,
    C: MaterialCatalog,
{
    repo: Arc<Q>,
    estimations: Arc<E>,
    projects: Arc<P>,
    artifacts: Arc<A>,
    catalog: Arc<C>,
    artifact_timeout: Duration,
}

impl<Q, E, P, A, C> QuotationService<Q, E, P, A, C>
where
    Q: QuotationRepository,
    E: EstimationRepository,
    P: ProjectDirectory,
    A: ArtifactGenerator,
    C: MaterialCatalog,
{
    /// Create a new quotation service.
    #[must_use]
    pub fn new(
        repo: Arc<Q>,
        estimations: Arc<E>,
        projects: Arc<P>,
        artifacts: Arc<A>,
        catalog: Arc<C>,
    ) -> Self {
        Self {
            repo,
            estimations,
            projects,
            artifacts,
            catalog,
            artifact_timeout: DEFAULT_ARTIFACT_TIMEOUT,
        }
    }

    /// Set the bound on document generation.
    #[must_use]
    pub fn with_artifact_timeout(mut self, timeout: Duration) -> Self {
        self.artifact_timeout = timeout;
        self
    }

    /// Create the next quotation version of a `(project, estimate_version)` lineage.
    ///
    /// The row starts `Draft` and unlocked with server-computed totals.
    /// Document generation runs after the write; its failure is logged and
    /// the quotation is returned without a document.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` if the project reference does not resolve
    /// - `EstimationNotFound` if the baseline does not exist
    /// - `Validation` for negative item values
    /// - `VersionConflict` if concurrent writers exhaust the retry budget
    pub async fn create_quotation(
        &self,
        input: CreateQuotationInput,
    ) -> Result<Quotation, QuotationError> {
        let project = resolve_project(&*self.projects, &input.project_ref).await?;
        let estimate_version = self
            .resolve_estimate_version(project.id, input.estimate_version)
            .await?;
        let (items, totals) = self.price(input.items).await?;

        let created = self
            .insert_next(project.id, estimate_version, |version, now| {
                Ok(Quotation {
                    id: Uuid::now_v7(),
                    project_id: project.id,
                    estimate_version,
                    version,
                    status: QuotationStatus::Draft,
                    locked: false,
                    remarks: input.remarks.clone(),
                    items: items.clone(),
                    totals,
                    artifact_url: None,
                    sent_to: None,
                    sent_at: None,
                    locked_at: None,
                    created_by: input.created_by,
                    updated_by: input.created_by,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await?;

        info!(
            quotation_id = %created.id,
            project_id = %created.project_id,
            estimate_version = created.estimate_version,
            version = created.version,
            grand_total = %created.totals.grand_total,
            "Quotation created"
        );
        Ok(self.attach_artifact(created).await)
    }

    /// Create a new version from an existing unlocked one.
    ///
    /// The prior row is left untouched. The new row takes the next free
    /// version in the lineage, which is `prior + 1` when revising the latest.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the quotation does not exist
    /// - `Locked` if the prior row is locked
    /// - `Validation` for negative item values
    pub async fn revise_quotation(
        &self,
        id: Uuid,
        content: QuotationContentInput,
    ) -> Result<Quotation, QuotationError> {
        let prior = self.get_quotation(id).await?;
        QuotationLifecycle::ensure_mutable(&prior)?;
        let (items, totals) = self.price(content.items).await?;

        let revised = self
            .insert_next(prior.project_id, prior.estimate_version, |version, now| {
                QuotationLifecycle::revision(
                    &prior,
                    version,
                    items.clone(),
                    totals,
                    content.remarks.clone(),
                    content.updated_by,
                    now,
                )
            })
            .await?;

        info!(
            quotation_id = %revised.id,
            revised_from = %prior.id,
            project_id = %revised.project_id,
            estimate_version = revised.estimate_version,
            version = revised.version,
            "Quotation revised"
        );
        Ok(self.attach_artifact(revised).await)
    }

    /// Mark a quotation as sent to `sent_to`.
    ///
    /// Re-sending is allowed and restamps `sent_at`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the quotation does not exist
    /// - `Validation` if the recipient is blank
    pub async fn send_quotation(
        &self,
        id: Uuid,
        sent_to: &str,
    ) -> Result<Quotation, QuotationError> {
        let sent_to = sent_to.trim();
        if sent_to.is_empty() {
            return Err(QuotationError::Validation(
                "sent_to is required".to_string(),
            ));
        }

        let quotation = self
            .repo
            .mark_sent(id, sent_to.to_string(), Utc::now())
            .await?;

        info!(
            quotation_id = %id,
            sent_to = %sent_to,
            status = %quotation.status,
            "Quotation sent"
        );
        Ok(quotation)
    }

    /// Edit an unlocked quotation in place.
    ///
    /// Totals are recomputed; version and status do not change.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the quotation does not exist
    /// - `Locked` if the row is locked
    /// - `Validation` for negative item values
    pub async fn update_quotation(
        &self,
        id: Uuid,
        content: QuotationContentInput,
    ) -> Result<Quotation, QuotationError> {
        let mut quotation = self.get_quotation(id).await?;
        QuotationLifecycle::ensure_mutable(&quotation)?;
        let (items, totals) = self.price(content.items).await?;

        QuotationLifecycle::update(
            &mut quotation,
            items,
            totals,
            content.remarks,
            content.updated_by,
            Utc::now(),
        )?;
        let quotation = self.repo.update_content(quotation).await?;

        info!(
            quotation_id = %id,
            version = quotation.version,
            grand_total = %quotation.totals.grand_total,
            "Quotation updated"
        );
        Ok(self.attach_artifact(quotation).await)
    }

    /// Confirm and lock a quotation, from any status.
    ///
    /// Locking an already locked quotation returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the quotation does not exist.
    pub async fn lock_quotation(&self, id: Uuid) -> Result<Quotation, QuotationError> {
        let Some(quotation) = self.repo.lock(id, Utc::now()).await? else {
            // Already locked, possibly by a concurrent caller.
            return self.get_quotation(id).await;
        };

        info!(
            quotation_id = %id,
            version = quotation.version,
            "Quotation confirmed and locked"
        );
        Ok(quotation)
    }

    /// Get a quotation by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the quotation does not exist.
    pub async fn get_quotation(&self, id: Uuid) -> Result<Quotation, QuotationError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(QuotationError::NotFound(id))
    }

    /// Version history of a project, optionally for one baseline and status.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` if the project reference does not resolve
    /// - `InvalidStatus` for an unknown status filter
    pub async fn get_quotation_versions(
        &self,
        project_ref: &str,
        estimate_version: Option<i32>,
        status: Option<&str>,
    ) -> Result<Vec<Quotation>, QuotationError> {
        let project = resolve_project(&*self.projects, project_ref).await?;
        let status = parse_status_filter(status)?;

        self.repo
            .list_versions(QuotationFilter {
                project_id: Some(project.id),
                estimate_version,
                status,
                ..QuotationFilter::default()
            })
            .await
    }

    /// Global filtered, paginated listing.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the date range is inverted.
    pub async fn get_quotations(
        &self,
        filter: QuotationFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Quotation>, QuotationError> {
        if let (Some(from), Some(to)) = (filter.created_from, filter.created_to) {
            if from > to {
                return Err(QuotationError::Validation(
                    "created_from must not be after created_to".to_string(),
                ));
            }
        }

        let page = page.normalized();
        let (data, total) = self.repo.list(filter, page).await?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Peek at the version the next quotation in a lineage would receive.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` if the project reference does not resolve
    /// - `EstimationNotFound` if the baseline does not exist
    pub async fn get_next_quotation_version(
        &self,
        project_ref: &str,
        estimate_version: Option<i32>,
    ) -> Result<i32, QuotationError> {
        let project = resolve_project(&*self.projects, project_ref).await?;
        let estimate_version = self
            .resolve_estimate_version(project.id, estimate_version)
            .await?;
        Ok(next_version(
            self.repo
                .latest_version(project.id, estimate_version)
                .await?,
        ))
    }

    async fn resolve_estimate_version(
        &self,
        project_id: Uuid,
        requested: Option<i32>,
    ) -> Result<i32, QuotationError> {
        let found = match requested {
            Some(version) => self
                .estimations
                .find_by_version(project_id, version)
                .await?
                .map(|e| e.version),
            None => self
                .estimations
                .latest_for_project(project_id)
                .await?
                .map(|e| e.version),
        };

        found.ok_or(QuotationError::EstimationNotFound {
            project_id,
            estimate_version: requested,
        })
    }

    /// Resolve catalog descriptions, then validate and price.
    async fn price(
        &self,
        mut items: QuotationItems,
    ) -> Result<(QuotationItems, QuotationTotals), QuotationError> {
        for item in &mut items.material_items {
            let fallback = std::mem::take(&mut item.description);
            item.description =
                resolve_description(&*self.catalog, item.material_id, fallback).await;
        }
        price_items(items)
    }

    /// Read-latest-then-insert with bounded retry on version collisions.
    async fn insert_next<F>(
        &self,
        project_id: Uuid,
        estimate_version: i32,
        mut build: F,
    ) -> Result<Quotation, QuotationError>
    where
        F: FnMut(i32, DateTime<Utc>) -> Result<Quotation, QuotationError> + Send,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let latest = self.repo.latest_version(project_id, estimate_version).await?;
            let quotation = build(next_version(latest), Utc::now())?;

            match self.repo.insert(quotation).await {
                Ok(created) => return Ok(created),
                Err(QuotationError::VersionConflict { version, .. })
                    if attempt < MAX_VERSION_ATTEMPTS =>
                {
                    warn!(
                        project_id = %project_id,
                        estimate_version,
                        version,
                        attempt,
                        "Quotation version taken by a concurrent writer, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Generate and attach a document, keeping the prior reference on failure.
    async fn attach_artifact(&self, mut quotation: Quotation) -> Quotation {
        let generated =
            tokio::time::timeout(self.artifact_timeout, self.artifacts.generate(&quotation)).await;

        let url = match generated {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                warn!(
                    quotation_id = %quotation.id,
                    error = %e,
                    "Quotation document generation failed"
                );
                return quotation;
            }
            Err(_) => {
                warn!(
                    quotation_id = %quotation.id,
                    timeout_secs = self.artifact_timeout.as_secs(),
                    "Quotation document generation timed out"
                );
                return quotation;
            }
        };

        match self.repo.set_artifact_url(quotation.id, url.clone()).await {
            Ok(true) => quotation.artifact_url = Some(url),
            Ok(false) => warn!(
                quotation_id = %quotation.id,
                "Quotation locked before its document was attached, keeping prior reference"
            ),
            Err(e) => warn!(
                quotation_id = %quotation.id,
                error = %e,
                "Failed to attach quotation document"
            ),
        }
        quotation
    }
}

fn parse_status_filter(status: Option<&str>) -> Result<Option<QuotationStatus>, QuotationError> {
    status
        .map(|s| QuotationStatus::parse(s).ok_or_else(|| QuotationError::InvalidStatus(s.to_string())))
        .transpose()
}
