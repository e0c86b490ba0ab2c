//! Material catalog backed by the materials table.

use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::entities::materials;
use estimo_core::catalog::{CatalogError, MaterialCatalog};

/// Material catalog repository implementation.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    db: DatabaseConnection,
}

impl MaterialRepository {
    /// Create a new material repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl MaterialCatalog for MaterialRepository {
    async fn describe(&self, material_id: Uuid) -> Result<Option<String>, CatalogError> {
        let model = materials::Entity::find_by_id(material_id)
            .one(&self.db)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        Ok(model.map(|m| m.name))
    }
}
