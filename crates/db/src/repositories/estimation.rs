//! Estimation repository for database operations.
//!
//! Inserts run in a transaction together with the owning project's
//! `estimate_created` flag, and rely on the `(project_id, version)` unique
//! key to reject concurrent writers of the same version.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::{
    estimations, projects, sea_orm_active_enums::EstimationStatus as DbEstimationStatus,
};
use estimo_core::estimation::{
    Estimation, EstimationError, EstimationFilter, EstimationRepository as EstimationRepoTrait,
    EstimationStatus,
};

/// Estimation repository implementation.
#[derive(Debug, Clone)]
pub struct EstimationRepository {
    db: DatabaseConnection,
}

impl EstimationRepository {
    /// Create a new estimation repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl EstimationRepoTrait for EstimationRepository {
    async fn latest_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Option<Estimation>, EstimationError> {
        let model = estimations::Entity::find()
            .filter(estimations::Column::ProjectId.eq(project_id))
            .order_by_desc(estimations::Column::Version)
            .one(&self.db)
            .await
            .map_err(|e| EstimationError::Database(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn find_by_version(
        &self,
        project_id: Uuid,
        version: i32,
    ) -> Result<Option<Estimation>, EstimationError> {
        let model = estimations::Entity::find()
            .filter(estimations::Column::ProjectId.eq(project_id))
            .filter(estimations::Column::Version.eq(version))
            .one(&self.db)
            .await
            .map_err(|e| EstimationError::Database(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Estimation>, EstimationError> {
        let model = estimations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EstimationError::Database(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn insert(
        &self,
        estimation: Estimation,
        first_for_project: bool,
    ) -> Result<Estimation, EstimationError> {
        let project_id = estimation.project_id;
        let version = estimation.version;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EstimationError::Database(e.to_string()))?;

        let model = to_active_model(estimation)
            .insert(&txn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    debug!(%project_id, version, "Estimation version taken");
                    EstimationError::VersionConflict {
                        project_id,
                        version,
                    }
                } else {
                    EstimationError::Database(e.to_string())
                }
            })?;

        if first_for_project {
            projects::Entity::update_many()
                .set(projects::ActiveModel {
                    estimate_created: Set(true),
                    updated_at: Set(model.created_at),
                    ..Default::default()
                })
                .filter(projects::Column::Id.eq(project_id))
                .exec(&txn)
                .await
                .map_err(|e| EstimationError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| EstimationError::Database(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn list(&self, filter: EstimationFilter) -> Result<Vec<Estimation>, EstimationError> {
        let mut query = estimations::Entity::find();

        if let Some(project_id) = filter.project_id {
            query = query.filter(estimations::Column::ProjectId.eq(project_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(estimations::Column::Status.eq(to_db_status(status)));
        }

        let models = query
            .order_by_asc(estimations::Column::CreatedAt)
            .order_by_asc(estimations::Column::Version)
            .all(&self.db)
            .await
            .map_err(|e| EstimationError::Database(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: EstimationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Estimation>, EstimationError> {
        let result = estimations::Entity::update_many()
            .set(estimations::ActiveModel {
                status: Set(to_db_status(status)),
                updated_at: Set(updated_at.into()),
                ..Default::default()
            })
            .filter(estimations::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| EstimationError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

/// Convert domain estimation status to database enum.
fn to_db_status(status: EstimationStatus) -> DbEstimationStatus {
    match status {
        EstimationStatus::Pending => DbEstimationStatus::Pending,
        EstimationStatus::Approved => DbEstimationStatus::Approved,
        EstimationStatus::Rejected => DbEstimationStatus::Rejected,
    }
}

/// Convert database enum to domain estimation status.
pub(crate) fn from_db_status(status: DbEstimationStatus) -> EstimationStatus {
    match status {
        DbEstimationStatus::Pending => EstimationStatus::Pending,
        DbEstimationStatus::Approved => EstimationStatus::Approved,
        DbEstimationStatus::Rejected => EstimationStatus::Rejected,
    }
}

fn to_active_model(estimation: Estimation) -> estimations::ActiveModel {
    estimations::ActiveModel {
        id: Set(estimation.id),
        project_id: Set(estimation.project_id),
        version: Set(estimation.version),
        labor_cost: Set(estimation.labor_cost),
        material_cost: Set(estimation.material_cost),
        service_cost: Set(estimation.service_cost),
        contingency_cost: Set(estimation.contingency_cost),
        total_cost: Set(estimation.total_cost),
        status: Set(to_db_status(estimation.status)),
        notes: Set(estimation.notes),
        created_by: Set(estimation.created_by),
        created_at: Set(estimation.created_at.into()),
        updated_at: Set(estimation.updated_at.into()),
    }
}

/// Convert a database row to the domain estimation.
pub(crate) fn to_domain(model: estimations::Model) -> Estimation {
    Estimation {
        id: model.id,
        project_id: model.project_id,
        version: model.version,
        labor_cost: model.labor_cost,
        material_cost: model.material_cost,
        service_cost: model.service_cost,
        contingency_cost: model.contingency_cost,
        total_cost: model.total_cost,
        status: from_db_status(model.status),
        notes: model.notes,
        created_by: model.created_by,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}
