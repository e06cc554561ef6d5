pub mod app_config;
pub mod condition;
pub mod config;
pub mod error;
pub mod form;
pub mod gallery;
pub mod gifts;
pub mod ports;
pub mod product;
pub mod specs;
pub mod validation;

pub use app_config::{AppConfig, Environment};
pub use condition::{
    BatteryHealth, ColorFading, ComponentCondition, ConditionDetails, LaptopCondition,
    OverallCondition, Severity,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{BackendError, CatalogError, PersistenceError, UploadError};
pub use form::{FormAction, ProductForm};
pub use gallery::{
    Gallery, GalleryImage, GalleryLimits, ImageFile, ImageRejection, RejectionReason,
};
pub use gifts::{load_gift_presets, preset_gifts, FreeGift, GiftCategory};
pub use ports::{BlobStore, ImageCompressor, NoopCompressor, ProductStore};
pub use product::{
    AccessoryDetails, Availability, CatalogStats, Condition, LaptopDetails, Product,
    ProductFields, ProductImages, ProductKind, ProductType,
};
pub use specs::{DetailedSpecs, GraphicsType, StorageType, UpgradeKind, UpgradeOptions};
pub use validation::{
    parse_discount, validate_fields, ValidationError, MAX_DISCOUNT, MAX_DISCOUNT_SCALE, MAX_IMAGES,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read gift presets file {path}: {source}")]
    GiftsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse gift presets file: {0}")]
    GiftsFileParse(#[source] serde_yaml::Error),

    #[error("gift preset validation failed: {0}")]
    Validation(String),
}

/// Returned when a stored string does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
