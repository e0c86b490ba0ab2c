//! Project repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::{projects, sea_orm_active_enums::ProjectStatus as DbProjectStatus};
use estimo_core::project::{
    Project, ProjectDirectory as ProjectRepoTrait, ProjectError, ProjectStatus,
};

/// Project repository implementation.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Create a new project repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ProjectRepoTrait for ProjectRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ProjectError> {
        let model = projects::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Project>, ProjectError> {
        let model = projects::Entity::find()
            .filter(projects::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn create(&self, project: Project) -> Result<Project, ProjectError> {
        let active_model = projects::ActiveModel {
            id: Set(project.id),
            code: Set(project.code.clone()),
            name: Set(project.name),
            status: Set(to_db_status(project.status)),
            manager_id: Set(project.manager_id),
            client_name: Set(project.client_name),
            estimate_created: Set(project.estimate_created),
            created_at: Set(project.created_at.into()),
            updated_at: Set(project.updated_at.into()),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ProjectError::DuplicateCode(project.code)
            } else {
                ProjectError::Database(e.to_string())
            }
        })?;

        Ok(to_domain(model))
    }

    async fn list(&self) -> Result<Vec<Project>, ProjectError> {
        let models = projects::Entity::find()
            .order_by_asc(projects::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ProjectStatus,
    ) -> Result<Option<Project>, ProjectError> {
        let result = projects::Entity::update_many()
            .set(projects::ActiveModel {
                status: Set(to_db_status(status)),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(projects::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

/// Convert domain project status to database enum.
fn to_db_status(status: ProjectStatus) -> DbProjectStatus {
    match status {
        ProjectStatus::OnHold => DbProjectStatus::OnHold,
        ProjectStatus::Active => DbProjectStatus::Active,
        ProjectStatus::InProgress => DbProjectStatus::InProgress,
        ProjectStatus::Completed => DbProjectStatus::Completed,
        ProjectStatus::Cancelled => DbProjectStatus::Cancelled,
    }
}

fn from_db_status(status: DbProjectStatus) -> ProjectStatus {
    match status {
        DbProjectStatus::OnHold => ProjectStatus::OnHold,
        DbProjectStatus::Active => ProjectStatus::Active,
        DbProjectStatus::InProgress => ProjectStatus::InProgress,
        DbProjectStatus::Completed => ProjectStatus::Completed,
        DbProjectStatus::Cancelled => ProjectStatus::Cancelled,
    }
}

fn to_domain(model: projects::Model) -> Project {
    Project {
        id: model.id,
        code: model.code,
        name: model.name,
        status: from_db_status(model.status),
        manager_id: model.manager_id,
        client_name: model.client_name,
        estimate_created: model.estimate_created,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}
