use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage rate limited the request (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("invalid storage base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("could not decode image {file_name}: {source}")]
    Decode {
        file_name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("could not encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("compression task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StorageError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Http(e) => e.is_timeout() || e.is_connect(),
            StorageError::RateLimited { .. } => true,
            StorageError::UnexpectedStatus { status, .. } => *status >= 500,
            StorageError::InvalidBaseUrl { .. }
            | StorageError::Decode { .. }
            | StorageError::Encode(_)
            | StorageError::Task(_) => false,
        }
    }
}
