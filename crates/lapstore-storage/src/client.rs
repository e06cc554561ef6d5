//! HTTP client for a Supabase-Storage-compatible object API.

use std::time::Duration;

use async_trait::async_trait;
use lapstore_core::{AppConfig, BackendError, BlobStore, ImageFile};
use reqwest::Client;
use uuid::Uuid;

use crate::error::StorageError;
use crate::retry::retry_with_backoff;

/// `Cache-Control` sent with every uploaded object (one hour).
const CACHE_CONTROL: &str = "max-age=3600";

#[derive(Clone)]
pub struct StorageConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`. No trailing slash.
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
    /// Folder inside the bucket that holds product images.
    pub prefix: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl StorageConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.storage_url.clone(),
            service_key: config.storage_key.clone(),
            bucket: config.storage_bucket.clone(),
            prefix: config.storage_prefix.clone(),
            timeout_secs: config.storage_timeout_secs,
            max_retries: config.storage_max_retries,
            retry_backoff_ms: config.storage_retry_backoff_ms,
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"[redacted]")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

/// Uploads and releases product images in a single storage bucket.
///
/// Objects are named `<prefix>/<uuid>.<ext>` and never overwritten. Only URLs
/// under this bucket's public URL are considered managed; anything else is
/// left alone on delete.
#[derive(Debug, Clone)]
pub struct StorageClient {
    client: Client,
    config: StorageConfig,
}

impl StorageClient {
    /// Creates a client with the configured per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidBaseUrl`] if the base URL does not parse,
    /// or [`StorageError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(mut config: StorageConfig) -> Result<Self, StorageError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.prefix = config.prefix.trim_matches('/').to_string();
        reqwest::Url::parse(&config.base_url).map_err(|e| StorageError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// A fresh object path for `file` inside the configured prefix.
    #[must_use]
    pub fn object_path_for(&self, file: &ImageFile) -> String {
        let name = format!("{}.{}", Uuid::new_v4(), file.extension());
        if self.config.prefix.is_empty() {
            name
        } else {
            format!("{}/{name}", self.config.prefix)
        }
    }

    #[must_use]
    pub fn public_url(&self, object_path: &str) -> String {
        format!("{}{object_path}", self.public_root())
    }

    fn public_root(&self) -> String {
        format!(
            "{}/storage/v1/object/public/{}/",
            self.config.base_url, self.config.bucket
        )
    }

    /// The object path behind a managed public URL, or `None` for any URL
    /// outside this bucket.
    #[must_use]
    pub fn object_path_from_url(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.public_root())?;
        let path = rest.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() || path.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return None;
        }
        Some(path.to_string())
    }

    /// Uploads `file` under a new object name and returns its public URL.
    ///
    /// # Errors
    ///
    /// - [`StorageError::UnexpectedStatus`] for non-2xx responses (5xx retried).
    /// - [`StorageError::RateLimited`] after retries are exhausted on 429.
    /// - [`StorageError::Http`] for network failures after retries are exhausted.
    pub async fn upload(&self, file: &ImageFile) -> Result<String, StorageError> {
        let object_path = self.object_path_for(file);
        let url = format!(
            "{}/storage/v1/object/{}/{object_path}",
            self.config.base_url, self.config.bucket
        );

        retry_with_backoff(self.config.max_retries, self.config.retry_backoff_ms, || {
            let url = url.clone();
            let body = file.bytes.clone();
            async move {
                let response = self
                    .authorized(self.client.post(&url))
                    .header(reqwest::header::CONTENT_TYPE, &file.content_type)
                    .header(reqwest::header::CACHE_CONTROL, CACHE_CONTROL)
                    .header("x-upsert", "false")
                    .body(body)
                    .send()
                    .await?;
                check_status(response, &url).await
            }
        })
        .await?;

        let public_url = self.public_url(&object_path);
        tracing::debug!(
            file_name = %file.file_name,
            bytes = file.size(),
            url = %public_url,
            "image uploaded"
        );
        Ok(public_url)
    }

    /// Removes the object behind `url`.
    ///
    /// Returns `false` without touching the network when `url` is not managed
    /// by this bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the delete request fails.
    pub async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        let Some(object_path) = self.object_path_from_url(url) else {
            tracing::debug!(url, "not a managed storage URL, skipping delete");
            return Ok(false);
        };

        let endpoint = format!(
            "{}/storage/v1/object/{}",
            self.config.base_url, self.config.bucket
        );
        let body = serde_json::json!({ "prefixes": [object_path] });

        retry_with_backoff(self.config.max_retries, self.config.retry_backoff_ms, || {
            let endpoint = endpoint.clone();
            let body = body.clone();
            async move {
                let response = self
                    .authorized(self.client.delete(&endpoint))
                    .json(&body)
                    .send()
                    .await?;
                check_status(response, &endpoint).await
            }
        })
        .await?;

        tracing::debug!(object_path = %object_path, "image deleted");
        Ok(true)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
    }
}

async fn check_status(response: reqwest::Response, url: &str) -> Result<(), StorageError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(StorageError::RateLimited { retry_after_secs });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StorageError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }

    Ok(())
}

#[async_trait]
impl BlobStore for StorageClient {
    async fn upload(&self, file: &ImageFile) -> Result<String, BackendError> {
        Ok(StorageClient::upload(self, file).await?)
    }

    async fn delete(&self, url: &str) -> Result<(), BackendError> {
        StorageClient::delete(self, url).await?;
        Ok(())
    }

    fn is_managed(&self, url: &str) -> bool {
        self.object_path_from_url(url).is_some()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
