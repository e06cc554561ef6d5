use std::collections::HashSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::product::ProductFields;

/// Maximum number of gallery images per product.
pub const MAX_IMAGES: usize = 10;

/// Upper bound of the discount percentage.
pub const MAX_DISCOUNT: Decimal = Decimal::ONE_HUNDRED;

/// Decimal places kept for a discount; the `discount` column is `NUMERIC(5, 2)`.
pub const MAX_DISCOUNT_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("discount must be a number, got '{0}'")]
    InvalidDiscount(String),

    #[error("discount must be between 0 and 100, got {0}")]
    DiscountOutOfRange(Decimal),

    #[error("discount allows at most 2 decimal places, got {0}")]
    DiscountTooPrecise(Decimal),

    #[error("too many images: {count} (max {max})")]
    TooManyImages { count: usize, max: usize },

    #[error("primary image '{0}' is not part of the gallery")]
    PrimaryNotInImages(String),

    #[error("image '{0}' appears more than once")]
    DuplicateImage(String),

    #[error("free gift '{0}' is listed more than once")]
    DuplicateGift(String),

    #[error("free gift names cannot be empty")]
    EmptyGiftName,
}

/// Parses a raw discount input. Blank input means no discount.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDiscount`] for non-numeric input and
/// [`ValidationError::DiscountOutOfRange`] outside `[0, 100]`, and
/// [`ValidationError::DiscountTooPrecise`] past two decimal places.
pub fn parse_discount(raw: &str) -> Result<Option<Decimal>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: Decimal = raw
        .parse()
        .map_err(|_| ValidationError::InvalidDiscount(raw.to_string()))?;
    check_discount(value)?;
    Ok(Some(value))
}

fn check_discount(value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > MAX_DISCOUNT {
        return Err(ValidationError::DiscountOutOfRange(value));
    }
    if value.normalize().scale() > MAX_DISCOUNT_SCALE {
        return Err(ValidationError::DiscountTooPrecise(value));
    }
    Ok(())
}

/// Checks every invariant a product payload must satisfy before it is
/// persisted. Used by the editor before submit and again by the store.
///
/// # Errors
///
/// Returns the first violated rule as a [`ValidationError`].
pub fn validate_fields(fields: &ProductFields) -> Result<(), ValidationError> {
    if fields.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if fields.specs.trim().is_empty() {
        return Err(ValidationError::MissingField("specs"));
    }
    if fields.price.trim().is_empty() {
        return Err(ValidationError::MissingField("price"));
    }

    if let Some(discount) = fields.discount {
        check_discount(discount)?;
    }

    let images = &fields.images;
    if images.images.len() > MAX_IMAGES {
        return Err(ValidationError::TooManyImages {
            count: images.images.len(),
            max: MAX_IMAGES,
        });
    }
    if images.images.is_empty() {
        if !images.primary.is_empty() {
            return Err(ValidationError::PrimaryNotInImages(images.primary.clone()));
        }
    } else if !images.images.contains(&images.primary) {
        return Err(ValidationError::PrimaryNotInImages(images.primary.clone()));
    }
    let mut urls = HashSet::new();
    for url in &images.images {
        if !urls.insert(url.as_str()) {
            return Err(ValidationError::DuplicateImage(url.clone()));
        }
    }

    if let Some(gifts) = fields.free_gifts() {
        let mut seen = HashSet::new();
        for gift in gifts {
            if gift.name.trim().is_empty() {
                return Err(ValidationError::EmptyGiftName);
            }
            if !seen.insert(gift.id.as_str()) {
                return Err(ValidationError::DuplicateGift(gift.id.clone()));
            }
        }
    }

    Ok(())
}
