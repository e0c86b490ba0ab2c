//! Material catalog lookups.
//!
//! Quotation material lines reference catalog entries by id. The catalog
//! only supplies a display name; pricing always comes from the line itself.

use thiserror::Error;
use uuid::Uuid;

/// Catalog lookup failure.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached or read.
    #[error("Material catalog unavailable: {0}")]
    Unavailable(String),
}

/// Resolves material references to descriptive names.
///
/// This trait is implemented by the db crate against the materials table.
pub trait MaterialCatalog: Send + Sync {
    /// Name of a material, or `None` if the reference is unknown.
    fn describe(
        &self,
        material_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<String>, CatalogError>> + Send;
}

/// Resolve a material description, tolerating catalog failures.
///
/// Falls back to the caller-supplied text when there is no reference, the
/// reference is unknown, or the lookup fails.
pub async fn resolve_description<C: MaterialCatalog>(
    catalog: &C,
    material_id: Option<Uuid>,
    fallback: String,
) -> String {
    let Some(material_id) = material_id else {
        return fallback;
    };

    match catalog.describe(material_id).await {
        Ok(Some(name)) if !name.trim().is_empty() => name,
        Ok(_) => fallback,
        Err(e) => {
            tracing::warn!(
                material_id = %material_id,
                error = %e,
                "Material lookup failed, keeping supplied description"
            );
            fallback
        }
    }
}
