//! Storage service implementation using Apache OpenDAL.

use estimo_shared::StorageSettings;
use opendal::{ErrorKind, Operator, services};

use super::error::StorageError;

/// A written object and where it can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Storage key.
    pub key: String,
    /// Public URL.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
}

/// Storage service for generated documents.
#[derive(Clone)]
pub struct StorageService {
    operator: Operator,
    provider: &'static str,
    public_base_url: String,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let (operator, provider) = Self::create_operator(settings)?;
        Ok(Self {
            operator,
            provider,
            public_base_url: settings.public_base_url().trim_end_matches('/').to_string(),
        })
    }

    /// In-memory storage, for tests and local runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn in_memory(public_base_url: impl Into<String>) -> Result<Self, StorageError> {
        Self::from_settings(&StorageSettings::Memory {
            public_base_url: public_base_url.into(),
        })
    }

    /// Create OpenDAL operator from provider settings.
    fn create_operator(
        settings: &StorageSettings,
    ) -> Result<(Operator, &'static str), StorageError> {
        match settings {
            StorageSettings::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
                ..
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                let operator = Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();
                Ok((operator, "s3"))
            }
            StorageSettings::Fs { root, .. } => {
                let builder = services::Fs::default().root(root);

                let operator = Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();
                Ok((operator, "fs"))
            }
            StorageSettings::Memory { .. } => {
                let operator = Operator::new(services::Memory::default())
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();
                Ok((operator, "memory"))
            }
        }
    }

    /// Write an object, replacing any previous content at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    pub async fn write(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        validate_key(key)?;
        let size = content.len() as u64;

        if self.operator.info().full_capability().write_with_content_type {
            self.operator
                .write_with(key, content)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(key, content).await?;
        }

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    /// Read an object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object does not exist.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        match self.operator.read(key).await {
            Ok(buffer) => Ok(buffer.to_vec()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Public URL for a key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }
}

/// Sanitize one path segment of a storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
#[must_use]
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.ends_with('/') || key.split('/').any(|s| s == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("PRJ-2025-014"), "PRJ-2025-014");
        assert_eq!(sanitize_segment("my file (1)"), "my_file__1_");
        assert_eq!(sanitize_segment("日本"), "__");
    }

    #[test]
    fn test_public_url_joins_base_and_key() {
        let storage = StorageService::in_memory("https://files.test/docs/").unwrap();
        assert_eq!(
            storage.public_url("quotations/a/e1/v1.txt"),
            "https://files.test/docs/quotations/a/e1/v1.txt"
        );
        assert_eq!(storage.provider_name(), "memory");
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let storage = StorageService::in_memory("https://files.test").unwrap();

        let stored = storage
            .write("quotations/p/e1/v1.txt", b"hello".to_vec(), "text/plain")
            .await
            .unwrap();

        assert_eq!(stored.url, "https://files.test/quotations/p/e1/v1.txt");
        assert_eq!(stored.size, 5);
        assert!(storage.exists("quotations/p/e1/v1.txt").await);
        assert_eq!(
            storage.read("quotations/p/e1/v1.txt").await.unwrap(),
            b"hello".to_vec()
        );
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let storage = StorageService::in_memory("https://files.test").unwrap();
        let err = storage.read("quotations/none.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected() {
        let storage = StorageService::in_memory("https://files.test").unwrap();
        for key in ["", "dir/", "a/../b"] {
            let err = storage
                .write(key, Vec::new(), "text/plain")
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)));
        }
    }
}
