use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("LAPSTORE_ENV", "development"))?;

    let bind_addr: SocketAddr =
        parse_as("LAPSTORE_BIND_ADDR", &or_default("LAPSTORE_BIND_ADDR", "0.0.0.0:3000"))?;
    let log_level = or_default("LAPSTORE_LOG_LEVEL", "info");
    let gifts_path = lookup("LAPSTORE_GIFTS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let admin_api_keys: Vec<String> = or_default("LAPSTORE_ADMIN_API_KEYS", "")
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if admin_api_keys.is_empty() && env != Environment::Development {
        return Err(ConfigError::InvalidEnvVar {
            var: "LAPSTORE_ADMIN_API_KEYS".to_string(),
            reason: format!("at least one key is required in {env}"),
        });
    }

    let db_max_connections: u32 = parse_as(
        "LAPSTORE_DB_MAX_CONNECTIONS",
        &or_default("LAPSTORE_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "LAPSTORE_DB_MIN_CONNECTIONS",
        &or_default("LAPSTORE_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "LAPSTORE_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("LAPSTORE_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let storage_url = require("LAPSTORE_STORAGE_URL")?
        .trim_end_matches('/')
        .to_string();
    let storage_key = require("LAPSTORE_STORAGE_KEY")?;
    let storage_bucket = or_default("LAPSTORE_STORAGE_BUCKET", "product-images");
    let storage_prefix = or_default("LAPSTORE_STORAGE_PREFIX", "products")
        .trim_matches('/')
        .to_string();
    let storage_timeout_secs: u64 = parse_as(
        "LAPSTORE_STORAGE_TIMEOUT_SECS",
        &or_default("LAPSTORE_STORAGE_TIMEOUT_SECS", "30"),
    )?;
    let storage_max_retries: u32 = parse_as(
        "LAPSTORE_STORAGE_MAX_RETRIES",
        &or_default("LAPSTORE_STORAGE_MAX_RETRIES", "2"),
    )?;
    let storage_retry_backoff_ms: u64 = parse_as(
        "LAPSTORE_STORAGE_RETRY_BACKOFF_MS",
        &or_default("LAPSTORE_STORAGE_RETRY_BACKOFF_MS", "500"),
    )?;

    let image_max_upload_bytes: usize = parse_as(
        "LAPSTORE_IMAGE_MAX_UPLOAD_BYTES",
        &or_default("LAPSTORE_IMAGE_MAX_UPLOAD_BYTES", "5242880"),
    )?;
    let image_max_dimension: u32 = parse_as(
        "LAPSTORE_IMAGE_MAX_DIMENSION",
        &or_default("LAPSTORE_IMAGE_MAX_DIMENSION", "1920"),
    )?;
    let image_target_bytes: usize = parse_as(
        "LAPSTORE_IMAGE_TARGET_BYTES",
        &or_default("LAPSTORE_IMAGE_TARGET_BYTES", "1048576"),
    )?;
    let image_jpeg_quality: u8 = parse_as(
        "LAPSTORE_IMAGE_JPEG_QUALITY",
        &or_default("LAPSTORE_IMAGE_JPEG_QUALITY", "85"),
    )?;
    if !(1..=100).contains(&image_jpeg_quality) {
        return Err(ConfigError::InvalidEnvVar {
            var: "LAPSTORE_IMAGE_JPEG_QUALITY".to_string(),
            reason: format!("must be between 1 and 100, got {image_jpeg_quality}"),
        });
    }
    if image_max_dimension == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LAPSTORE_IMAGE_MAX_DIMENSION".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        gifts_path,
        admin_api_keys,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        storage_url,
        storage_key,
        storage_bucket,
        storage_prefix,
        storage_timeout_secs,
        storage_max_retries,
        storage_retry_backoff_ms,
        image_max_upload_bytes,
        image_max_dimension,
        image_target_bytes,
        image_jpeg_quality,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for values other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LAPSTORE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
