use thiserror::Error;
use uuid::Uuid;

use crate::gallery::ImageRejection;
use crate::validation::ValidationError;

/// Opaque error raised by a backend adapter.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image rejected: {0}")]
    Rejected(ImageRejection),

    #[error("upload of {file_name} failed: {source}")]
    Failed {
        file_name: String,
        #[source]
        source: BackendError,
    },

    #[error("upload of {file_name} timed out after {secs}s")]
    TimedOut { file_name: String, secs: u64 },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("product {0} not found")]
    NotFound(Uuid),

    #[error("invalid product: {0}")]
    Invalid(ValidationError),

    #[error("{operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: BackendError,
    },
}

impl PersistenceError {
    pub fn backend(
        operation: &'static str,
        source: impl Into<BackendError>,
    ) -> Self {
        Self::Backend {
            operation,
            source: source.into(),
        }
    }
}

/// Failure of a catalog workflow operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Persistence(PersistenceError),

    #[error("product {0} not found")]
    NotFound(Uuid),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<PersistenceError> for CatalogError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(id) => CatalogError::NotFound(id),
            PersistenceError::Invalid(e) => CatalogError::Validation(e),
            other => CatalogError::Persistence(other),
        }
    }
}

impl CatalogError {
    /// Message safe to show to the seller. Backend details are never exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Validation(e) => e.to_string(),
            CatalogError::Upload(UploadError::Rejected(r)) => r.to_string(),
            CatalogError::Upload(UploadError::Failed { file_name, .. }) => {
                format!("Failed to upload {file_name}. Please try again.")
            }
            CatalogError::Upload(UploadError::TimedOut { file_name, .. }) => {
                format!("Uploading {file_name} took too long. Please try again.")
            }
            CatalogError::Persistence(_) => {
                "Failed to save product. Please try again.".to_string()
            }
            CatalogError::NotFound(_) => "Product not found.".to_string(),
            CatalogError::Cancelled => "Cancelled.".to_string(),
        }
    }
}
