//! Quotation repository for database operations.
//!
//! Line items live in JSONB columns and are decoded on every read. Every
//! write touches only the columns it owns. Content, status, and document
//! writes filter on `locked = false`, so a concurrent lock always wins.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::{quotations, sea_orm_active_enums::QuotationStatus as DbQuotationStatus};
use estimo_core::quotation::{
    Quotation, QuotationError, QuotationFilter, QuotationItems,
    QuotationRepository as QuotationRepoTrait, QuotationStatus, QuotationTotals,
};
use estimo_shared::types::PageRequest;

/// Quotation repository implementation.
#[derive(Debug, Clone)]
pub struct QuotationRepository {
    db: DatabaseConnection,
}

impl QuotationRepository {
    /// Create a new quotation repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl QuotationRepoTrait for QuotationRepository {
    async fn latest_version(
        &self,
        project_id: Uuid,
        estimate_version: i32,
    ) -> Result<Option<i32>, QuotationError> {
        let model = quotations::Entity::find()
            .filter(quotations::Column::ProjectId.eq(project_id))
            .filter(quotations::Column::EstimateVersion.eq(estimate_version))
            .order_by_desc(quotations::Column::Version)
            .one(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        Ok(model.map(|m| m.version))
    }

    async fn insert(&self, quotation: Quotation) -> Result<Quotation, QuotationError> {
        let project_id = quotation.project_id;
        let estimate_version = quotation.estimate_version;
        let version = quotation.version;

        let model = to_active_model(quotation)?
            .insert(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    QuotationError::VersionConflict {
                        project_id,
                        estimate_version,
                        version,
                    }
                } else {
                    QuotationError::Database(e.to_string())
                }
            })?;

        to_domain(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, QuotationError> {
        let model = quotations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        model.map(to_domain).transpose()
    }

    async fn update_content(&self, quotation: Quotation) -> Result<Quotation, QuotationError> {
        let id = quotation.id;
        let items = &quotation.items;

        let result = quotations::Entity::update_many()
            .set(quotations::ActiveModel {
                remarks: Set(quotation.remarks.clone()),
                labor_items: Set(encode(id, &items.labor_items)?),
                material_items: Set(encode(id, &items.material_items)?),
                service_items: Set(encode(id, &items.service_items)?),
                contingency_items: Set(encode(id, &items.contingency_items)?),
                tax_items: Set(encode(id, &items.tax_items)?),
                subtotal: Set(quotation.totals.subtotal),
                total_contingency: Set(quotation.totals.total_contingency),
                total_tax: Set(quotation.totals.total_tax),
                grand_total: Set(quotation.totals.grand_total),
                updated_by: Set(quotation.updated_by),
                updated_at: Set(quotation.updated_at.into()),
                ..Default::default()
            })
            .filter(quotations::Column::Id.eq(id))
            .filter(quotations::Column::Locked.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        let stored = self
            .find_by_id(id)
            .await?
            .ok_or(QuotationError::NotFound(id))?;
        if result.rows_affected == 0 {
            return Err(QuotationError::Locked(id));
        }
        Ok(stored)
    }

    async fn mark_sent(
        &self,
        id: Uuid,
        sent_to: String,
        sent_at: DateTime<Utc>,
    ) -> Result<Quotation, QuotationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        // Takes the row lock, so a concurrent lock waits for this commit.
        let stamped = quotations::Entity::update_many()
            .set(quotations::ActiveModel {
                sent_to: Set(Some(sent_to)),
                sent_at: Set(Some(sent_at.into())),
                updated_at: Set(sent_at.into()),
                ..Default::default()
            })
            .filter(quotations::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;
        if stamped.rows_affected == 0 {
            return Err(QuotationError::NotFound(id));
        }

        quotations::Entity::update_many()
            .set(quotations::ActiveModel {
                status: Set(DbQuotationStatus::Sent),
                ..Default::default()
            })
            .filter(quotations::Column::Id.eq(id))
            .filter(quotations::Column::Locked.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or(QuotationError::NotFound(id))
    }

    async fn lock(
        &self,
        id: Uuid,
        locked_at: DateTime<Utc>,
    ) -> Result<Option<Quotation>, QuotationError> {
        let result = quotations::Entity::update_many()
            .set(quotations::ActiveModel {
                status: Set(DbQuotationStatus::Confirmed),
                locked: Set(true),
                locked_at: Set(Some(locked_at.into())),
                updated_at: Set(locked_at.into()),
                ..Default::default()
            })
            .filter(quotations::Column::Id.eq(id))
            .filter(quotations::Column::Locked.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        let stored = self
            .find_by_id(id)
            .await?
            .ok_or(QuotationError::NotFound(id))?;
        Ok((result.rows_affected > 0).then_some(stored))
    }

    async fn set_artifact_url(&self, id: Uuid, url: String) -> Result<bool, QuotationError> {
        let result = quotations::Entity::update_many()
            .set(quotations::ActiveModel {
                artifact_url: Set(Some(url)),
                ..Default::default()
            })
            .filter(quotations::Column::Id.eq(id))
            .filter(quotations::Column::Locked.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        if result.rows_affected > 0 {
            return Ok(true);
        }
        match self.find_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(QuotationError::NotFound(id)),
        }
    }

    async fn list(
        &self,
        filter: QuotationFilter,
        page: PageRequest,
    ) -> Result<(Vec<Quotation>, u64), QuotationError> {
        let page = page.normalized();
        let query = apply_filter(quotations::Entity::find(), &filter);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        let models = query
            .order_by_desc(quotations::Column::CreatedAt)
            .order_by_desc(quotations::Column::Version)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        let quotations = models
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((quotations, total))
    }

    async fn list_versions(
        &self,
        filter: QuotationFilter,
    ) -> Result<Vec<Quotation>, QuotationError> {
        let models = apply_filter(quotations::Entity::find(), &filter)
            .order_by_asc(quotations::Column::EstimateVersion)
            .order_by_asc(quotations::Column::Version)
            .all(&self.db)
            .await
            .map_err(|e| QuotationError::Database(e.to_string()))?;

        models.into_iter().map(to_domain).collect()
    }
}

fn apply_filter(
    mut query: Select<quotations::Entity>,
    filter: &QuotationFilter,
) -> Select<quotations::Entity> {
    if let Some(project_id) = filter.project_id {
        query = query.filter(quotations::Column::ProjectId.eq(project_id));
    }
    if let Some(estimate_version) = filter.estimate_version {
        query = query.filter(quotations::Column::EstimateVersion.eq(estimate_version));
    }
    if let Some(status) = filter.status {
        query = query.filter(quotations::Column::Status.eq(to_db_status(status)));
    }
    if let Some(from) = filter.created_from {
        query = query.filter(quotations::Column::CreatedAt.gte(from));
    }
    if let Some(to) = filter.created_to {
        query = query.filter(quotations::Column::CreatedAt.lte(to));
    }
    query
}

/// Convert domain quotation status to database enum.
fn to_db_status(status: QuotationStatus) -> DbQuotationStatus {
    match status {
        QuotationStatus::Draft => DbQuotationStatus::Draft,
        QuotationStatus::Sent => DbQuotationStatus::Sent,
        QuotationStatus::Revised => DbQuotationStatus::Revised,
        QuotationStatus::Confirmed => DbQuotationStatus::Confirmed,
        QuotationStatus::Locked => DbQuotationStatus::Locked,
    }
}

/// Convert database enum to domain quotation status.
pub(crate) fn from_db_status(status: DbQuotationStatus) -> QuotationStatus {
    match status {
        DbQuotationStatus::Draft => QuotationStatus::Draft,
        DbQuotationStatus::Sent => QuotationStatus::Sent,
        DbQuotationStatus::Revised => QuotationStatus::Revised,
        DbQuotationStatus::Confirmed => QuotationStatus::Confirmed,
        DbQuotationStatus::Locked => QuotationStatus::Locked,
    }
}

fn encode<T: Serialize>(id: Uuid, items: &T) -> Result<serde_json::Value, QuotationError> {
    serde_json::to_value(items)
        .map_err(|e| QuotationError::Database(format!("encode items of quotation {id}: {e}")))
}

fn decode<T: DeserializeOwned>(id: Uuid, value: serde_json::Value) -> Result<T, QuotationError> {
    serde_json::from_value(value)
        .map_err(|e| QuotationError::Database(format!("decode items of quotation {id}: {e}")))
}

fn to_active_model(quotation: Quotation) -> Result<quotations::ActiveModel, QuotationError> {
    let id = quotation.id;
    let items = &quotation.items;

    Ok(quotations::ActiveModel {
        id: Set(id),
        project_id: Set(quotation.project_id),
        estimate_version: Set(quotation.estimate_version),
        version: Set(quotation.version),
        status: Set(to_db_status(quotation.status)),
        locked: Set(quotation.locked),
        remarks: Set(quotation.remarks.clone()),
        labor_items: Set(encode(id, &items.labor_items)?),
        material_items: Set(encode(id, &items.material_items)?),
        service_items: Set(encode(id, &items.service_items)?),
        contingency_items: Set(encode(id, &items.contingency_items)?),
        tax_items: Set(encode(id, &items.tax_items)?),
        subtotal: Set(quotation.totals.subtotal),
        total_contingency: Set(quotation.totals.total_contingency),
        total_tax: Set(quotation.totals.total_tax),
        grand_total: Set(quotation.totals.grand_total),
        artifact_url: Set(quotation.artifact_url.clone()),
        sent_to: Set(quotation.sent_to.clone()),
        sent_at: Set(quotation.sent_at.map(Into::into)),
        locked_at: Set(quotation.locked_at.map(Into::into)),
        created_by: Set(quotation.created_by),
        updated_by: Set(quotation.updated_by),
        created_at: Set(quotation.created_at.into()),
        updated_at: Set(quotation.updated_at.into()),
    })
}

fn to_domain(model: quotations::Model) -> Result<Quotation, QuotationError> {
    let id = model.id;
    let items = QuotationItems {
        labor_items: decode(id, model.labor_items)?,
        material_items: decode(id, model.material_items)?,
        service_items: decode(id, model.service_items)?,
        contingency_items: decode(id, model.contingency_items)?,
        tax_items: decode(id, model.tax_items)?,
    };

    Ok(Quotation {
        id,
        project_id: model.project_id,
        estimate_version: model.estimate_version,
        version: model.version,
        status: from_db_status(model.status),
        locked: model.locked,
        remarks: model.remarks,
        items,
        totals: QuotationTotals {
            subtotal: model.subtotal,
            total_contingency: model.total_contingency,
            total_tax: model.total_tax,
            grand_total: model.grand_total,
        },
        artifact_url: model.artifact_url,
        sent_to: model.sent_to,
        sent_at: model.sent_at.map(Into::into),
        locked_at: model.locked_at.map(Into::into),
        created_by: model.created_by,
        updated_by: model.updated_by,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    })
}
