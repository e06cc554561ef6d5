//! In-memory backends for exercising the workflow without a database or
//! object store.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lapstore_core::{
    validate_fields, BackendError, BlobStore, ImageCompressor, ImageFile, PersistenceError,
    Product, ProductFields, ProductStore,
};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Product store held in a `Vec`, re-validating payloads like the real store.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
    calls: AtomicUsize,
    fail_writes: Mutex<bool>,
}

impl MemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    /// Every create/update/delete fails with a backend error while set.
    pub fn fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }

    /// Number of trait calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Product> {
        lock(&self.products).clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_write(&self, operation: &'static str) -> Result<(), PersistenceError> {
        if *lock(&self.fail_writes) {
            return Err(PersistenceError::backend(operation, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list_products(&self) -> Result<Vec<Product>, PersistenceError> {
        self.record_call();
        let mut products = self.snapshot();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, PersistenceError> {
        self.record_call();
        Ok(lock(&self.products).iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, fields: &ProductFields) -> Result<Product, PersistenceError> {
        self.record_call();
        self.check_write("create product")?;
        validate_fields(fields).map_err(PersistenceError::Invalid)?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.products).push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, PersistenceError> {
        self.record_call();
        self.check_write("update product")?;
        validate_fields(fields).map_err(PersistenceError::Invalid)?;
        let mut products = lock(&self.products);
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PersistenceError::NotFound(id))?;
        product.fields = fields.clone();
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), PersistenceError> {
        self.record_call();
        self.check_write("delete product")?;
        let mut products = lock(&self.products);
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }
}

/// URL prefix of objects held by [`MemoryBlobStore`].
pub const MEMORY_BLOB_ROOT: &str = "memory://blobs/";

/// Blob store keyed by URL under [`MEMORY_BLOB_ROOT`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<String, ImageFile>>,
    deleted: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    delays: Mutex<BTreeMap<String, Duration>>,
    uploads: AtomicUsize,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads of a file with this name fail.
    pub fn fail_upload_of(&self, file_name: &str) {
        lock(&self.failing).insert(file_name.to_owned());
    }

    /// Uploads of a file with this name wait `delay` before completing.
    pub fn delay_upload_of(&self, file_name: &str, delay: Duration) {
        lock(&self.delays).insert(file_name.to_owned(), delay);
    }

    /// Places an object in the store as if it had been uploaded earlier.
    pub fn seed(&self, url: &str, file: ImageFile) {
        lock(&self.objects).insert(url.to_owned(), file);
    }

    /// URLs of objects currently stored.
    #[must_use]
    pub fn stored(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }

    #[must_use]
    pub fn object(&self, url: &str) -> Option<ImageFile> {
        lock(&self.objects).get(url).cloned()
    }

    /// URLs passed to `delete`, in call order.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }

    /// Upload attempts made so far, failed ones included.
    #[must_use]
    pub fn upload_attempts(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, file: &ImageFile) -> Result<String, BackendError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let delay = lock(&self.delays).get(&file.file_name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing).contains(&file.file_name) {
            return Err(format!("storage rejected {}", file.file_name).into());
        }
        let url = format!("{MEMORY_BLOB_ROOT}{}-{}", Uuid::new_v4(), file.file_name);
        lock(&self.objects).insert(url.clone(), file.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), BackendError> {
        lock(&self.deleted).push(url.to_owned());
        lock(&self.objects).remove(url);
        Ok(())
    }

    fn is_managed(&self, url: &str) -> bool {
        url.starts_with(MEMORY_BLOB_ROOT)
    }
}

/// Compressor that always fails, to exercise the fall-back to originals.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCompressor;

#[async_trait]
impl ImageCompressor for FailingCompressor {
    async fn compress(&self, file: &ImageFile) -> Result<ImageFile, BackendError> {
        Err(format!("cannot decode {}", file.file_name).into())
    }
}

/// Compressor that replaces the bytes with a fixed marker and renames the
/// file to `.jpg`, so tests can tell compressed uploads apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerCompressor;

/// Bytes every file compressed by [`MarkerCompressor`] carries.
pub const COMPRESSED_MARKER: &[u8] = b"compressed";

#[async_trait]
impl ImageCompressor for MarkerCompressor {
    async fn compress(&self, file: &ImageFile) -> Result<ImageFile, BackendError> {
        let stem = file
            .file_name
            .rsplit_once('.')
            .map_or(file.file_name.as_str(), |(stem, _)| stem);
        Ok(ImageFile::new(
            format!("{stem}.jpg"),
            "image/jpeg",
            COMPRESSED_MARKER.to_vec(),
        ))
    }
}
