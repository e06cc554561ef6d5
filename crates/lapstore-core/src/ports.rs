//! Backend seams. The workflow only talks to persistence, blob storage and
//! image compression through these traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{BackendError, PersistenceError};
use crate::gallery::ImageFile;
use crate::product::{Product, ProductFields};

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, PersistenceError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, PersistenceError>;

    /// Persists a new product. The store assigns the id and both timestamps.
    async fn create_product(&self, fields: &ProductFields) -> Result<Product, PersistenceError>;

    /// Replaces every non-identifier field and refreshes `updated_at`.
    async fn update_product(
        &self,
        id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, PersistenceError>;

    async fn delete_product(&self, id: Uuid) -> Result<(), PersistenceError>;

    async fn health_check(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `file` and returns its public URL.
    async fn upload(&self, file: &ImageFile) -> Result<String, BackendError>;

    /// Releases the object behind `url`. Unmanaged URLs are left alone.
    async fn delete(&self, url: &str) -> Result<(), BackendError>;

    /// Whether `url` points into this store's namespace.
    fn is_managed(&self, url: &str) -> bool;
}

#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, file: &ImageFile) -> Result<ImageFile, BackendError>;
}

/// Passes files through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCompressor;

#[async_trait]
impl ImageCompressor for NoopCompressor {
    async fn compress(&self, file: &ImageFile) -> Result<ImageFile, BackendError> {
        Ok(file.clone())
    }
}
