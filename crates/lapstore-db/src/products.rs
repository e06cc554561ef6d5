//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use lapstore_core::{
    validate_fields, AccessoryDetails, Availability, Condition, LaptopDetails, ParseEnumError,
    Product, ProductFields, ProductImages, ProductKind, ProductType,
};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const PRODUCT_COLUMNS: &str = "id, name, specs, price, original_price, discount, type, category, \
     condition, warranty, availability, featured, image, images, detailed_specs, \
     laptop_condition, free_gifts, created_at, updated_at";

/// A row from the `products` table.
///
/// Enum-valued columns are kept as text here; [`TryFrom`] into [`Product`]
/// parses them and rejects unknown values.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub specs: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount: Option<Decimal>,
    #[sqlx(rename = "type")]
    pub product_type: String,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub warranty: Option<String>,
    pub availability: String,
    pub featured: bool,
    pub image: String,
    pub images: Vec<String>,
    pub detailed_specs: Option<Value>,
    pub laptop_condition: Option<Value>,
    pub free_gifts: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |reason: String| DbError::InvalidRow { id, reason };

        let product_type: ProductType = row
            .product_type
            .parse()
            .map_err(|e: ParseEnumError| invalid(e.to_string()))?;
        let condition = row
            .condition
            .as_deref()
            .map(str::parse::<Condition>)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;
        let availability: Availability = row
            .availability
            .parse()
            .map_err(|e: ParseEnumError| invalid(e.to_string()))?;

        let kind = match product_type {
            ProductType::Laptop => ProductKind::Laptop(LaptopDetails {
                detailed_specs: from_json(row.detailed_specs)
                    .map_err(|e| invalid(format!("detailed_specs: {e}")))?,
                laptop_condition: from_json(row.laptop_condition)
                    .map_err(|e| invalid(format!("laptop_condition: {e}")))?,
                free_gifts: from_json(row.free_gifts)
                    .map_err(|e| invalid(format!("free_gifts: {e}")))?,
            }),
            ProductType::Accessory => ProductKind::Accessory(AccessoryDetails {
                category: row.category,
            }),
        };

        Ok(Product {
            id,
            fields: ProductFields {
                name: row.name,
                specs: row.specs,
                price: row.price,
                original_price: row.original_price,
                discount: row.discount,
                condition,
                warranty: row.warranty,
                availability,
                featured: row.featured,
                images: ProductImages {
                    primary: row.image,
                    images: row.images,
                },
                kind,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn from_json<T: serde::de::DeserializeOwned>(
    value: Option<Value>,
) -> Result<Option<T>, serde_json::Error> {
    value.map(serde_json::from_value).transpose()
}

fn to_json<T: serde::Serialize + ?Sized>(
    value: Option<&T>,
) -> Result<Option<Value>, serde_json::Error> {
    value.map(serde_json::to_value).transpose()
}

/// Column values derived from a validated payload, ready for binding.
struct ProductColumns<'a> {
    fields: &'a ProductFields,
    category: Option<&'a str>,
    detailed_specs: Option<Value>,
    laptop_condition: Option<Value>,
    free_gifts: Option<Value>,
}

impl<'a> ProductColumns<'a> {
    fn new(fields: &'a ProductFields) -> Result<Self, DbError> {
        validate_fields(fields)?;
        Ok(Self {
            fields,
            category: fields.category(),
            detailed_specs: to_json(fields.detailed_specs())?,
            laptop_condition: to_json(fields.laptop_condition())?,
            free_gifts: to_json(fields.free_gifts())?,
        })
    }
}

/// Storefront listing filters. `None` means "any".
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub product_type: Option<ProductType>,
    pub featured: Option<bool>,
    pub limit: Option<i64>,
}

/// Lists products newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filter: &ProductFilter,
) -> Result<Vec<ProductRow>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE ($1::text IS NULL OR type = $1) \
           AND ($2::boolean IS NULL OR featured = $2) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $3"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(filter.product_type.map(ProductType::as_str))
        .bind(filter.featured)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns the product with the given id, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Option<ProductRow>, DbError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Inserts a product. The database assigns `id`, `created_at` and `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Invalid`] if the payload fails validation, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_product(pool: &PgPool, fields: &ProductFields) -> Result<ProductRow, DbError> {
    let cols = ProductColumns::new(fields)?;
    let sql = format!(
        "INSERT INTO products \
             (name, specs, price, original_price, discount, type, category, condition, \
              warranty, availability, featured, image, images, detailed_specs, \
              laptop_condition, free_gifts) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 $9, $10, $11, $12, $13, $14, \
                 $15, $16) \
         RETURNING {PRODUCT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(&cols.fields.name)
        .bind(&cols.fields.specs)
        .bind(&cols.fields.price)
        .bind(&cols.fields.original_price)
        .bind(cols.fields.discount)
        .bind(cols.fields.product_type().as_str())
        .bind(cols.category)
        .bind(cols.fields.condition.map(Condition::as_str))
        .bind(&cols.fields.warranty)
        .bind(cols.fields.availability.as_str())
        .bind(cols.fields.featured)
        .bind(&cols.fields.images.primary)
        .bind(&cols.fields.images.images)
        .bind(cols.detailed_specs)
        .bind(cols.laptop_condition)
        .bind(cols.free_gifts)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Replaces every non-identifier column of a product and refreshes `updated_at`.
///
/// Fields absent from the payload are written as `NULL`, so switching a
/// laptop to an accessory clears its laptop-only columns.
///
/// # Errors
///
/// Returns [`DbError::Invalid`] if the payload fails validation,
/// [`DbError::NotFound`] if no product has this id, or [`DbError::Sqlx`].
pub async fn update_product(
    pool: &PgPool,
    id: Uuid,
    fields: &ProductFields,
) -> Result<ProductRow, DbError> {
    let cols = ProductColumns::new(fields)?;
    let sql = format!(
        "UPDATE products SET \
             name             = $2, \
             specs            = $3, \
             price            = $4, \
             original_price   = $5, \
             discount         = $6, \
             type             = $7, \
             category         = $8, \
             condition        = $9, \
             warranty         = $10, \
             availability     = $11, \
             featured         = $12, \
             image            = $13, \
             images           = $14, \
             detailed_specs   = $15, \
             laptop_condition = $16, \
             free_gifts       = $17, \
             updated_at       = NOW() \
         WHERE id = $1 \
         RETURNING {PRODUCT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .bind(&cols.fields.name)
        .bind(&cols.fields.specs)
        .bind(&cols.fields.price)
        .bind(&cols.fields.original_price)
        .bind(cols.fields.discount)
        .bind(cols.fields.product_type().as_str())
        .bind(cols.category)
        .bind(cols.fields.condition.map(Condition::as_str))
        .bind(&cols.fields.warranty)
        .bind(cols.fields.availability.as_str())
        .bind(cols.fields.featured)
        .bind(&cols.fields.images.primary)
        .bind(&cols.fields.images.images)
        .bind(cols.detailed_specs)
        .bind(cols.laptop_condition)
        .bind(cols.free_gifts)
        .fetch_optional(pool)
        .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a product row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has this id, or [`DbError::Sqlx`].
pub async fn delete_product(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product_type: &str) -> ProductRow {
        ProductRow {
            id: Uuid::new_v4(),
            name: "Lenovo ThinkPad T480".to_string(),
            specs: "i5 8th gen, 8GB, 256GB SSD".to_string(),
            price: "₹24,999".to_string(),
            original_price: None,
            discount: None,
            product_type: product_type.to_string(),
            category: None,
            condition: Some("refurbished".to_string()),
            warranty: Some("6 months".to_string()),
            availability: "in_stock".to_string(),
            featured: false,
            image: String::new(),
            images: vec![],
            detailed_specs: Some(serde_json::json!({ "processor": "Intel Core i5-8250U" })),
            laptop_condition: None,
            free_gifts: Some(serde_json::json!([
                { "id": "1", "name": "Laptop Bag (Handbag)", "category": "bag", "is_default": true }
            ])),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn laptop_row_converts_with_nested_json() {
        let product = Product::try_from(row("laptop")).expect("valid row");
        assert_eq!(product.product_type(), ProductType::Laptop);
        assert_eq!(product.fields.condition, Some(Condition::Refurbished));
        assert_eq!(product.fields.availability, Availability::InStock);
        assert_eq!(
            product
                .fields
                .detailed_specs()
                .and_then(|s| s.processor.as_deref()),
            Some("Intel Core i5-8250U")
        );
        assert_eq!(product.fields.free_gifts().map(<[_]>::len), Some(1));
    }

    #[test]
    fn accessory_row_ignores_laptop_columns() {
        let mut r = row("accessory");
        r.category = Some("charger".to_string());
        let product = Product::try_from(r).expect("valid row");
        assert_eq!(product.fields.category(), Some("charger"));
        assert!(product.fields.detailed_specs().is_none());
    }

    #[test]
    fn unknown_enum_value_is_invalid_row() {
        let mut r = row("laptop");
        r.availability = "backorder".to_string();
        let err = Product::try_from(r).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow { ref reason, .. } if reason.contains("backorder")));
    }

    #[test]
    fn malformed_json_is_invalid_row() {
        let mut r = row("laptop");
        r.laptop_condition = Some(serde_json::json!({ "overall": "mint" }));
        let err = Product::try_from(r).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow { ref reason, .. } if reason.starts_with("laptop_condition")));
    }

    #[test]
    fn laptop_columns_serialize_gift_slice() {
        let product = Product::try_from(row("laptop")).expect("valid row");
        let cols = ProductColumns::new(&product.fields).expect("valid payload");

        let gifts = cols.free_gifts.expect("gifts column");
        assert_eq!(gifts[0]["name"], "Laptop Bag (Handbag)");
        assert_eq!(cols.detailed_specs.expect("specs column")["processor"], "Intel Core i5-8250U");
        assert!(cols.laptop_condition.is_none());
        assert!(cols.category.is_none());
    }

    #[test]
    fn accessory_columns_leave_laptop_json_null() {
        let mut r = row("accessory");
        r.category = Some("charger".to_string());
        let product = Product::try_from(r).expect("valid row");
        let cols = ProductColumns::new(&product.fields).expect("valid payload");

        assert_eq!(cols.category, Some("charger"));
        assert!(cols.free_gifts.is_none());
        assert!(cols.detailed_specs.is_none());
    }
}
