use std::net::SocketAddr;
use std::path::PathBuf;

use crate::gallery::GalleryLimits;
use crate::validation::MAX_IMAGES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML file overriding the built-in gift presets.
    pub gifts_path: Option<PathBuf>,
    /// Bearer tokens accepted on write routes.
    pub admin_api_keys: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub storage_url: String,
    pub storage_key: String,
    pub storage_bucket: String,
    pub storage_prefix: String,
    pub storage_timeout_secs: u64,
    pub storage_max_retries: u32,
    pub storage_retry_backoff_ms: u64,
    pub image_max_upload_bytes: usize,
    pub image_max_dimension: u32,
    pub image_target_bytes: usize,
    pub image_jpeg_quality: u8,
}

impl AppConfig {
    #[must_use]
    pub fn gallery_limits(&self) -> GalleryLimits {
        GalleryLimits {
            max_images: MAX_IMAGES,
            max_file_bytes: self.image_max_upload_bytes,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("gifts_path", &self.gifts_path)
            .field("database_url", &"[redacted]")
            .field("admin_api_keys", &format!("[{} redacted]", self.admin_api_keys.len()))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("storage_url", &self.storage_url)
            .field("storage_key", &"[redacted]")
            .field("storage_bucket", &self.storage_bucket)
            .field("storage_prefix", &self.storage_prefix)
            .field("storage_timeout_secs", &self.storage_timeout_secs)
            .field("storage_max_retries", &self.storage_max_retries)
            .field("storage_retry_backoff_ms", &self.storage_retry_backoff_ms)
            .field("image_max_upload_bytes", &self.image_max_upload_bytes)
            .field("image_max_dimension", &self.image_max_dimension)
            .field("image_target_bytes", &self.image_target_bytes)
            .field("image_jpeg_quality", &self.image_jpeg_quality)
            .finish()
    }
}
