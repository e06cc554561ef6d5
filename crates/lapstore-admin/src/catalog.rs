//! Catalog service: product CRUD plus the image side effects that go with it.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use lapstore_core::{
    validate_fields, AppConfig, BlobStore, CatalogError, CatalogStats, GalleryLimits,
    ImageCompressor, ImageFile, ImageRejection, PersistenceError, Product, ProductFields,
    ProductStore, RejectionReason, UploadError,
};
use uuid::Uuid;

use crate::session::EditSession;

/// Upload time budget when none is configured.
const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Limit on compressing and uploading a single image, retries included.
    pub upload_timeout: Duration,
    pub gallery_limits: GalleryLimits,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            gallery_limits: GalleryLimits::default(),
        }
    }
}

impl CatalogSettings {
    /// Derives the per-image budget from the storage request timeout times
    /// the number of attempts the storage client may make.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let attempts = u64::from(config.storage_max_retries) + 1;
        Self {
            upload_timeout: Duration::from_secs(
                config.storage_timeout_secs.saturating_mul(attempts),
            ),
            gallery_limits: config.gallery_limits(),
        }
    }
}

/// Product catalog backed by injected persistence, blob storage and
/// compression. Cheap to clone.
#[derive(Clone)]
pub struct Catalog {
    products: Arc<dyn ProductStore>,
    blobs: Arc<dyn BlobStore>,
    compressor: Arc<dyn ImageCompressor>,
    settings: CatalogSettings,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductStore>,
        blobs: Arc<dyn BlobStore>,
        compressor: Arc<dyn ImageCompressor>,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            products,
            blobs,
            compressor,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// A blank editing session for a new product.
    #[must_use]
    pub fn create_session(&self) -> EditSession {
        EditSession::create(self.settings.gallery_limits)
    }

    /// An editing session pre-filled from the stored product `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when no such product exists.
    pub async fn edit_session(&self, id: Uuid) -> Result<EditSession, CatalogError> {
        let product = self.get_product(id).await?;
        Ok(EditSession::edit(&product, self.settings.gallery_limits))
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] when the store fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.products
            .list_products()
            .await
            .map_err(|e| persistence_failure("list products", None, e))
    }

    /// # Errors
    ///
    /// See [`Catalog::list_products`].
    pub async fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let products = self.list_products().await?;
        Ok(CatalogStats::from_products(&products))
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the id is unknown, or
    /// [`CatalogError::Persistence`] when the store fails.
    pub async fn get_product(&self, id: Uuid) -> Result<Product, CatalogError> {
        self.products
            .get_product(id)
            .await
            .map_err(|e| persistence_failure("get product", Some(id), e))?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Validates `fields` locally and persists them as a new product.
    ///
    /// Invalid payloads never reach the store.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] or [`CatalogError::Persistence`].
    pub async fn create_product(&self, fields: &ProductFields) -> Result<Product, CatalogError> {
        validate_fields(fields)?;
        let product = self
            .products
            .create_product(fields)
            .await
            .map_err(|e| persistence_failure("create product", None, e))?;
        tracing::info!(
            product_id = %product.id,
            product_type = %product.product_type(),
            images = product.fields.images.images.len(),
            "product created"
        );
        Ok(product)
    }

    /// Validates `fields` locally and replaces the stored product `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`], [`CatalogError::NotFound`] or
    /// [`CatalogError::Persistence`].
    pub async fn update_product(
        &self,
        id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, CatalogError> {
        validate_fields(fields)?;
        let product = self
            .products
            .update_product(id, fields)
            .await
            .map_err(|e| persistence_failure("update product", Some(id), e))?;
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Releases every managed image of product `id`, then deletes the record.
    ///
    /// Image release is best effort: a blob that cannot be deleted is logged
    /// and does not keep the record alive.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the id is unknown, or
    /// [`CatalogError::Persistence`] when the store fails.
    pub async fn delete_product(&self, id: Uuid) -> Result<(), CatalogError> {
        let product = self.get_product(id).await?;
        let urls: Vec<String> = product.image_urls().into_iter().map(str::to_owned).collect();

        let released = self.release_images(&urls).await;
        self.products
            .delete_product(id)
            .await
            .map_err(|e| persistence_failure("delete product", Some(id), e))?;

        tracing::info!(
            product_id = %id,
            images = urls.len(),
            released,
            "product deleted"
        );
        Ok(())
    }

    /// Concurrently deletes the managed objects behind `urls`.
    ///
    /// URLs outside the blob store's namespace are skipped. Returns how many
    /// objects were released.
    pub async fn release_images(&self, urls: &[String]) -> usize {
        let managed: Vec<&str> = urls
            .iter()
            .map(String::as_str)
            .filter(|url| {
                let managed = self.blobs.is_managed(url);
                if !managed {
                    tracing::debug!(url, "external image URL, leaving it alone");
                }
                managed
            })
            .collect();

        let results = join_all(managed.iter().map(|url| self.blobs.delete(url))).await;

        let mut released = 0;
        for (url, result) in managed.iter().zip(results) {
            match result {
                Ok(()) => released += 1,
                Err(e) => tracing::warn!(url, error = %e, "failed to release image"),
            }
        }
        released
    }

    /// Compresses and uploads `files` concurrently, returning one URL per file
    /// in input order.
    ///
    /// Waits for every upload to settle. If any fails, the ones that succeeded
    /// are released and the first failure is returned. `on_uploaded` is called
    /// with each URL as soon as its upload completes.
    ///
    /// # Errors
    ///
    /// Returns the first [`UploadError`] among the files.
    pub async fn upload_images(
        &self,
        files: &[ImageFile],
        on_uploaded: &(dyn Fn(&str) + Send + Sync),
    ) -> Result<Vec<String>, UploadError> {
        let uploads = files.iter().map(|file| async move {
            let url = self.upload_one(file).await?;
            on_uploaded(&url);
            Ok::<_, UploadError>(url)
        });
        let results = join_all(uploads).await;

        let mut urls = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(url) => urls.push(url),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => tracing::debug!(error = %e, "additional upload failure"),
            }
        }

        if let Some(err) = first_error {
            if !urls.is_empty() {
                let released = self.release_images(&urls).await;
                tracing::warn!(
                    uploaded = urls.len(),
                    released,
                    "upload batch failed, released completed uploads"
                );
            }
            return Err(err);
        }
        Ok(urls)
    }

    async fn upload_one(&self, file: &ImageFile) -> Result<String, UploadError> {
        if !file.is_image() {
            return Err(UploadError::Rejected(ImageRejection {
                file_name: file.file_name.clone(),
                reason: RejectionReason::NotAnImage {
                    content_type: file.content_type.clone(),
                },
            }));
        }

        let timeout = self.settings.upload_timeout;
        let work = async {
            let prepared = self.compress_or_original(file).await;
            self.blobs.upload(&prepared).await
        };

        match tokio::time::timeout(timeout, work).await {
            Ok(Ok(url)) => Ok(url),
            Ok(Err(source)) => {
                tracing::error!(
                    file_name = %file.file_name,
                    error = %source,
                    "image upload failed"
                );
                Err(UploadError::Failed {
                    file_name: file.file_name.clone(),
                    source,
                })
            }
            Err(_) => {
                tracing::error!(
                    file_name = %file.file_name,
                    timeout_secs = timeout.as_secs(),
                    "image upload timed out"
                );
                Err(UploadError::TimedOut {
                    file_name: file.file_name.clone(),
                    secs: timeout.as_secs(),
                })
            }
        }
    }

    /// Compressed copy of `file`, or `file` itself if compression fails.
    async fn compress_or_original(&self, file: &ImageFile) -> ImageFile {
        match self.compressor.compress(file).await {
            Ok(compressed) => compressed,
            Err(e) => {
                tracing::warn!(
                    file_name = %file.file_name,
                    error = %e,
                    "image compression failed, uploading original"
                );
                file.clone()
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] when the store is unreachable.
    pub async fn health_check(&self) -> Result<(), CatalogError> {
        self.products
            .health_check()
            .await
            .map_err(|e| persistence_failure("health check", None, e))
    }
}

/// Logs a store failure with its original error and converts it.
fn persistence_failure(
    operation: &'static str,
    id: Option<Uuid>,
    err: PersistenceError,
) -> CatalogError {
    match &err {
        PersistenceError::NotFound(_) => {
            tracing::debug!(operation, product_id = ?id, "product not found");
        }
        PersistenceError::Invalid(e) => {
            tracing::warn!(operation, product_id = ?id, error = %e, "store rejected payload");
        }
        PersistenceError::Backend { .. } => {
            tracing::error!(operation, product_id = ?id, error = %err, "persistence failed");
        }
    }
    err.into()
}
