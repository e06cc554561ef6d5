use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::condition::LaptopCondition;
use crate::gifts::FreeGift;
use crate::specs::DetailedSpecs;
use crate::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Laptop,
    Accessory,
}

impl ProductType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Laptop => "laptop",
            ProductType::Accessory => "accessory",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "laptop" => Ok(ProductType::Laptop),
            "accessory" => Ok(ProductType::Accessory),
            other => Err(ParseEnumError {
                kind: "product type",
                value: other.to_string(),
            }),
        }
    }
}

/// Sale condition shown on the storefront card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl Condition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
            Condition::Refurbished => "refurbished",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            "refurbished" => Ok(Condition::Refurbished),
            other => Err(ParseEnumError {
                kind: "condition",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    InStock,
    OutOfStock,
    Limited,
}

impl Availability {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::Limited => "limited",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Availability::InStock),
            "out_of_stock" => Ok(Availability::OutOfStock),
            "limited" => Ok(Availability::Limited),
            other => Err(ParseEnumError {
                kind: "availability",
                value: other.to_string(),
            }),
        }
    }
}

/// Laptop-only sub-records. Each is omitted entirely when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaptopDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_specs: Option<DetailedSpecs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laptop_condition: Option<LaptopCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_gifts: Option<Vec<FreeGift>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryDetails {
    /// Freeform accessory category, e.g. `"mouse"` or `"charger"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The product type together with the fields that are only legal for it.
///
/// Serialized with an inline `"type"` tag, so an accessory payload can never
/// carry laptop-only keys and a laptop payload can never carry a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProductKind {
    Laptop(LaptopDetails),
    Accessory(AccessoryDetails),
}

impl ProductKind {
    #[must_use]
    pub fn product_type(&self) -> ProductType {
        match self {
            ProductKind::Laptop(_) => ProductType::Laptop,
            ProductKind::Accessory(_) => ProductType::Accessory,
        }
    }
}

/// Primary image plus the ordered gallery.
///
/// `image` is always one of `images`, or empty when `images` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImages {
    #[serde(rename = "image", default)]
    pub primary: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductImages {
    /// Builds the image set with the image at `primary_index` as primary,
    /// falling back to the first image when the index is out of range.
    #[must_use]
    pub fn new(images: Vec<String>, primary_index: usize) -> Self {
        let primary = images
            .get(primary_index)
            .or_else(|| images.first())
            .cloned()
            .unwrap_or_default();
        Self { primary, images }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every URL referenced by this set, primary included, without duplicates.
    #[must_use]
    pub fn all_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.images.iter().map(String::as_str).collect();
        if !self.primary.is_empty() && !urls.contains(&self.primary.as_str()) {
            urls.insert(0, self.primary.as_str());
        }
        urls
    }
}

/// Everything a product carries except the backend-assigned id and timestamps.
/// This is the payload of create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    /// Freeform one-line summary, e.g. `"i5, 8GB, 512GB SSD"`.
    pub specs: String,
    /// Display price exactly as entered, e.g. `"₹28,000"`.
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
    /// Percentage in `[0, 100]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub featured: bool,
    #[serde(flatten)]
    pub images: ProductImages,
    #[serde(flatten)]
    pub kind: ProductKind,
}

impl ProductFields {
    #[must_use]
    pub fn product_type(&self) -> ProductType {
        self.kind.product_type()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            ProductKind::Accessory(details) => details.category.as_deref(),
            ProductKind::Laptop(_) => None,
        }
    }

    #[must_use]
    pub fn laptop_details(&self) -> Option<&LaptopDetails> {
        match &self.kind {
            ProductKind::Laptop(details) => Some(details),
            ProductKind::Accessory(_) => None,
        }
    }

    #[must_use]
    pub fn detailed_specs(&self) -> Option<&DetailedSpecs> {
        self.laptop_details()
            .and_then(|d| d.detailed_specs.as_ref())
    }

    #[must_use]
    pub fn laptop_condition(&self) -> Option<&LaptopCondition> {
        self.laptop_details()
            .and_then(|d| d.laptop_condition.as_ref())
    }

    #[must_use]
    pub fn free_gifts(&self) -> Option<&[FreeGift]> {
        self.laptop_details()
            .and_then(|d| d.free_gifts.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ProductFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub fn product_type(&self) -> ProductType {
        self.fields.product_type()
    }

    /// URLs of every image the product references, primary first.
    #[must_use]
    pub fn image_urls(&self) -> Vec<&str> {
        self.fields.images.all_urls()
    }
}

/// Inventory breakdown shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub laptops: usize,
    pub accessories: usize,
}

impl CatalogStats {
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        let laptops = products
            .iter()
            .filter(|p| p.product_type() == ProductType::Laptop)
            .count();
        Self {
            total: products.len(),
            laptops,
            accessories: products.len() - laptops,
        }
    }

    /// Rounded share of laptops in the inventory, `0` when empty.
    #[must_use]
    pub fn laptop_percent(&self) -> u32 {
        percent(self.laptops, self.total)
    }

    #[must_use]
    pub fn accessory_percent(&self) -> u32 {
        percent(self.accessories, self.total)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::DetailedSpecs;

    fn laptop_fields() -> ProductFields {
        ProductFields {
            name: "Dell Inspiron 15".to_string(),
            specs: "i5, 8GB, 512GB SSD".to_string(),
            price: "₹28,000".to_string(),
            original_price: None,
            discount: None,
            condition: Some(Condition::Refurbished),
            warranty: None,
            availability: Availability::InStock,
            featured: false,
            images: ProductImages::empty(),
            kind: ProductKind::Laptop(LaptopDetails {
                detailed_specs: Some(DetailedSpecs {
                    processor: Some("Intel Core i5".to_string()),
                    ..DetailedSpecs::default()
                }),
                laptop_condition: None,
                free_gifts: None,
            }),
        }
    }

    fn make_product(fields: ProductFields) -> Product {
        Product {
            id: Uuid::new_v4(),
            fields,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn product_type_roundtrips_through_str() {
        for ty in [ProductType::Laptop, ProductType::Accessory] {
            assert_eq!(ty.as_str().parse::<ProductType>().unwrap(), ty);
        }
        assert!("tablet".parse::<ProductType>().is_err());
    }

    #[test]
    fn availability_defaults_to_in_stock() {
        assert_eq!(Availability::default(), Availability::InStock);
        assert_eq!(
            "out_of_stock".parse::<Availability>().unwrap(),
            Availability::OutOfStock
        );
    }

    #[test]
    fn condition_rejects_unknown_value() {
        let err = "mint".parse::<Condition>().unwrap_err();
        assert_eq!(err.kind, "condition");
        assert_eq!(err.value, "mint");
    }

    #[test]
    fn product_images_new_picks_requested_primary() {
        let images = ProductImages::new(vec!["a".to_string(), "b".to_string()], 1);
        assert_eq!(images.primary, "b");
    }

    #[test]
    fn product_images_new_falls_back_to_first_image() {
        let images = ProductImages::new(vec!["a".to_string(), "b".to_string()], 7);
        assert_eq!(images.primary, "a");
    }

    #[test]
    fn product_images_new_empty_list_has_empty_primary() {
        let images = ProductImages::new(vec![], 0);
        assert_eq!(images.primary, "");
        assert!(images.images.is_empty());
    }

    #[test]
    fn all_urls_includes_primary_outside_list_once() {
        let images = ProductImages {
            primary: "legacy".to_string(),
            images: vec!["a".to_string()],
        };
        assert_eq!(images.all_urls(), vec!["legacy", "a"]);

        let images = ProductImages::new(vec!["a".to_string(), "b".to_string()], 1);
        assert_eq!(images.all_urls(), vec!["a", "b"]);
    }

    #[test]
    fn laptop_serializes_with_type_tag_and_nested_specs() {
        let json = serde_json::to_value(laptop_fields()).expect("serialize");
        assert_eq!(json["type"], "laptop");
        assert_eq!(json["image"], "");
        assert_eq!(json["images"], serde_json::json!([]));
        assert_eq!(json["detailed_specs"]["processor"], "Intel Core i5");
        assert!(json.get("category").is_none());
        assert!(json.get("laptop_condition").is_none());
        assert!(json.get("free_gifts").is_none());
    }

    #[test]
    fn accessory_payload_drops_laptop_only_keys() {
        let json = serde_json::json!({
            "name": "Logitech M235",
            "specs": "Wireless mouse",
            "price": "₹799",
            "type": "accessory",
            "category": "mouse",
            "detailed_specs": { "processor": "Intel Core i7" },
            "free_gifts": [],
        });
        let fields: ProductFields = serde_json::from_value(json).expect("deserialize");
        assert_eq!(fields.product_type(), ProductType::Accessory);
        assert_eq!(fields.category(), Some("mouse"));
        assert!(fields.detailed_specs().is_none());
        assert!(fields.free_gifts().is_none());
        assert_eq!(fields.availability, Availability::InStock);
        assert!(!fields.featured);

        let back = serde_json::to_value(&fields).expect("serialize");
        assert!(back.get("detailed_specs").is_none());
        assert!(back.get("free_gifts").is_none());
    }

    #[test]
    fn product_serde_roundtrip_preserves_fields() {
        let product = make_product(laptop_fields());
        let json = serde_json::to_string(&product).expect("serialize");
        let decoded: Product = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, product);
    }

    #[test]
    fn catalog_stats_counts_and_rounds_percentages() {
        let mut accessory = laptop_fields();
        accessory.kind = ProductKind::Accessory(AccessoryDetails::default());
        let products = vec![
            make_product(laptop_fields()),
            make_product(laptop_fields()),
            make_product(accessory),
        ];
        let stats = CatalogStats::from_products(&products);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.laptops, 2);
        assert_eq!(stats.accessories, 1);
        assert_eq!(stats.laptop_percent(), 67);
        assert_eq!(stats.accessory_percent(), 33);
    }

    #[test]
    fn catalog_stats_empty_inventory_is_zero_percent() {
        let stats = CatalogStats::from_products(&[]);
        assert_eq!(stats.laptop_percent(), 0);
        assert_eq!(stats.accessory_percent(), 0);
    }
}
