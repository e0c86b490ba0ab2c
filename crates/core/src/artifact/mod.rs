//! Quotation document generation.
//!
//! Documents are best-effort: the quotation engine calls the generator
//! behind a timeout and logs failures without failing the write.

mod render;

use thiserror::Error;

use crate::quotation::Quotation;
use crate::storage::{StorageError, StorageService};

pub use render::render_text;

/// Artifact generation failure.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Rendering failed.
    #[error("Render failed: {0}")]
    Render(String),

    /// The rendered document could not be stored.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Renders a durable document for a quotation version.
pub trait ArtifactGenerator: Send + Sync {
    /// Generate the document and return its URL.
    fn generate(
        &self,
        quotation: &Quotation,
    ) -> impl std::future::Future<Output = Result<String, ArtifactError>> + Send;
}

/// Storage key for a quotation version's document.
///
/// Format: `quotations/{project_id}/e{estimate_version}/v{version}.txt`
#[must_use]
pub fn artifact_key(quotation: &Quotation) -> String {
    format!(
        "quotations/{}/e{}/v{}.txt",
        quotation.project_id, quotation.estimate_version, quotation.version
    )
}

/// Plain-text document generator backed by object storage.
#[derive(Clone)]
pub struct StorageArtifactGenerator {
    storage: StorageService,
}

impl StorageArtifactGenerator {
    /// Create a generator writing to `storage`.
    #[must_use]
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }
}

impl ArtifactGenerator for StorageArtifactGenerator {
    async fn generate(&self, quotation: &Quotation) -> Result<String, ArtifactError> {
        let document = render_text(quotation);
        let stored = self
            .storage
            .write(
                &artifact_key(quotation),
                document.into_bytes(),
                "text/plain; charset=utf-8",
            )
            .await?;

        tracing::debug!(
            quotation_id = %quotation.id,
            key = %stored.key,
            size = stored.size,
            "Quotation document stored"
        );
        Ok(stored.url)
    }
}
