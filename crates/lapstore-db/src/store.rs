//! [`ProductStore`] backed by Postgres.

use async_trait::async_trait;
use lapstore_core::{PersistenceError, Product, ProductFields, ProductStore};
use sqlx::PgPool;
use uuid::Uuid;

use crate::products::{self, ProductFilter};
use crate::DbError;

#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Filtered listing used by the storefront catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] if the query fails or a row is malformed.
    pub async fn list_filtered(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, PersistenceError> {
        let rows = products::list_products(&self.pool, filter)
            .await
            .map_err(|e| into_persistence("list products", None, e))?;
        rows.into_iter()
            .map(|row| Product::try_from(row).map_err(|e| into_persistence("list products", None, e)))
            .collect()
    }
}

fn into_persistence(operation: &'static str, id: Option<Uuid>, err: DbError) -> PersistenceError {
    match (err, id) {
        (DbError::NotFound, Some(id)) => PersistenceError::NotFound(id),
        (DbError::Invalid(e), _) => PersistenceError::Invalid(e),
        (other, _) => PersistenceError::backend(operation, other),
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list_products(&self) -> Result<Vec<Product>, PersistenceError> {
        self.list_filtered(&ProductFilter::default()).await
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, PersistenceError> {
        let row = products::get_product(&self.pool, id)
            .await
            .map_err(|e| into_persistence("get product", Some(id), e))?;
        row.map(Product::try_from)
            .transpose()
            .map_err(|e| into_persistence("get product", Some(id), e))
    }

    async fn create_product(&self, fields: &ProductFields) -> Result<Product, PersistenceError> {
        let row = products::create_product(&self.pool, fields)
            .await
            .map_err(|e| into_persistence("create product", None, e))?;
        tracing::debug!(product_id = %row.id, "product inserted");
        Product::try_from(row).map_err(|e| into_persistence("create product", None, e))
    }

    async fn update_product(
        &self,
        id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, PersistenceError> {
        let row = products::update_product(&self.pool, id, fields)
            .await
            .map_err(|e| into_persistence("update product", Some(id), e))?;
        Product::try_from(row).map_err(|e| into_persistence("update product", Some(id), e))
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), PersistenceError> {
        products::delete_product(&self.pool, id)
            .await
            .map_err(|e| into_persistence("delete product", Some(id), e))
    }

    async fn health_check(&self) -> Result<(), PersistenceError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| into_persistence("health check", None, e))
    }
}
