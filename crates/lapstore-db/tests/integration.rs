//! Offline unit tests for lapstore-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use lapstore_core::{AppConfig, Environment, Product, ProductType};
use lapstore_db::{PoolConfig, ProductFilter, ProductRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        gifts_path: None,
        admin_api_keys: vec!["key".to_string()],
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        storage_url: "https://storage.example".to_string(),
        storage_key: "secret".to_string(),
        storage_bucket: "product-images".to_string(),
        storage_prefix: "products".to_string(),
        storage_timeout_secs: 30,
        storage_max_retries: 2,
        storage_retry_backoff_ms: 500,
        image_max_upload_bytes: 5 * 1024 * 1024,
        image_max_dimension: 1920,
        image_target_bytes: 1024 * 1024,
        image_jpeg_quality: 85,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn product_filter_defaults_to_unfiltered() {
    let filter = ProductFilter::default();
    assert!(filter.product_type.is_none());
    assert!(filter.featured.is_none());
    assert!(filter.limit.is_none());
}

/// Compile-time smoke test: confirm that [`ProductRow`] has all expected
/// fields with the correct types and converts into a domain product.
#[test]
fn product_row_has_expected_fields() {
    let row = ProductRow {
        id: Uuid::new_v4(),
        name: "Logitech MK270 Combo".to_string(),
        specs: "Wireless keyboard and mouse".to_string(),
        price: "₹1,499".to_string(),
        original_price: Some("₹1,995".to_string()),
        discount: Some(rust_decimal::Decimal::new(25, 0)),
        product_type: "accessory".to_string(),
        category: Some("keyboard".to_string()),
        condition: Some("new".to_string()),
        warranty: None,
        availability: "limited".to_string(),
        featured: true,
        image: "https://cdn/1.jpg".to_string(),
        images: vec!["https://cdn/1.jpg".to_string()],
        detailed_specs: None,
        laptop_condition: None,
        free_gifts: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let product = Product::try_from(row).expect("valid row");
    assert_eq!(product.product_type(), ProductType::Accessory);
    assert_eq!(product.fields.category(), Some("keyboard"));
    assert_eq!(product.image_urls(), vec!["https://cdn/1.jpg"]);
}
